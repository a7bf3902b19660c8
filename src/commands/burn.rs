//! Burn command
//!
//! Everything up to the composed command is decided before `pjet` is
//! started, so a bad setting never reaches the hardware.

use crate::cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use pjburn_core::compose::BurnerCommand;
use pjburn_core::env::{EnvDefaults, ProcessEnv};
use pjburn_core::image::{read_image, read_limit, Image, ImageSource};
use pjburn_core::platform::PlatformRegistry;
use pjburn_core::resolve::{resolve, Settings};
use pjburn_core::shape::{shape, ShapeOutcome};
use std::io::Write;
use std::process::{Command, Stdio};

/// Bytes written to `pjet` per progress update
const CHUNK_SIZE: usize = 64 * 1024;

/// A command and the shaped image it is fed
#[derive(Debug)]
struct PreparedBurn {
    command: BurnerCommand,
    data: Vec<u8>,
    outcome: ShapeOutcome,
    /// Input was cut short at read time and not truncated by shaping
    clipped: bool,
}

/// Resolve settings for `image`, compose the `pjet` command and shape the data
fn prepare(
    settings: &Settings,
    pjet_command: Option<&str>,
    env: &EnvDefaults,
    registry: &PlatformRegistry,
    filename: Option<&str>,
    image: Image,
) -> Result<PreparedBurn, Box<dyn std::error::Error>> {
    let Image {
        mut data,
        limit_reached,
    } = image;

    let resolution = resolve(settings, env, registry, filename, &data)?;
    let config = &resolution.config;

    let command = BurnerCommand::new(pjet_command, config, data.len() as u64);

    let outcome = shape(&mut data, config);
    // Shaping already warned when it truncated
    let clipped = limit_reached && !matches!(outcome, ShapeOutcome::Truncated(_));

    Ok(PreparedBurn {
        command,
        data,
        outcome,
        clipped,
    })
}

/// Resolve, shape and burn `file` (`-` for stdin)
pub fn run_burn(
    cli: &Cli,
    file: &str,
    registry: &PlatformRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = ImageSource::from_arg(file);
    let image = read_image(&source)?;

    let env = EnvDefaults::from_source(&ProcessEnv);
    let filename = source.filename();
    // Shape before a dry run returns so truncation warnings show either way
    let prepared = prepare(
        &cli.settings(),
        cli.pjet_command.as_deref(),
        &env,
        registry,
        filename.as_deref(),
        image,
    )?;

    match prepared.outcome {
        ShapeOutcome::Padded(n) => log::debug!("Padded image by {} bytes", n),
        ShapeOutcome::Truncated(n) => log::debug!("Dropped {} bytes from the end of the image", n),
        ShapeOutcome::Unchanged => {}
    }
    if prepared.clipped {
        log::warn!(
            "input file larger than {} bytes - the rest was not read and will not be burned",
            read_limit()
        );
    }

    if cli.dry_run {
        println!("{}", prepared.command);
        return Ok(());
    }

    if cli.verbose > 0 {
        println!("{}", prepared.command);
    }

    run_burner(&prepared.command, &prepared.data, cli.verbose > 0)
}

/// Create the progress bar for streaming into `pjet`
fn create_progress_bar(total: u64) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Start `pjet` and stream the image into its stdin
///
/// `pjet` output is discarded unless `show_output` is set.
fn run_burner(
    command: &BurnerCommand,
    data: &[u8],
    show_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = if show_output {
        Stdio::inherit()
    } else {
        Stdio::null()
    };

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(stdout)
        .spawn()
        .map_err(|e| {
            format!(
                "could not write image to promjet: failed to start {}: {}",
                command.program, e
            )
        })?;

    let pb = create_progress_bar(data.len() as u64)
        .unwrap_or_else(|_| ProgressBar::new(data.len() as u64));

    let written = match child.stdin.take() {
        Some(mut stdin) => data
            .chunks(CHUNK_SIZE)
            .try_for_each(|chunk| {
                stdin.write_all(chunk)?;
                pb.inc(chunk.len() as u64);
                Ok::<(), std::io::Error>(())
            })
            .and_then(|_| stdin.flush()),
        None => Err(std::io::Error::other("pjet stdin not available")),
    };
    pb.finish_and_clear();

    // stdin is closed by now; always reap the child
    let status = child.wait()?;

    if let Err(e) = written {
        return Err(format!("could not write image to promjet: {}", e).into());
    }
    if !status.success() {
        return Err(format!(
            "could not write image to promjet: {} exited with {}",
            command.program, status
        )
        .into());
    }

    log::info!("Wrote {} bytes to promjet", data.len());
    Ok(())
}
