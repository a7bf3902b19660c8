//! pjburn - Promjet burner front-end
//!
//! The Emutec `pjet` tool hangs on many image sizes, and a hung Promjet needs
//! a hard reset. `pjet` works reliably when the image is exactly the size of
//! the emulated memory, but its arguments are cryptic.
//!
//! pjburn takes Unix-style arguments, fills in whatever is missing from
//! environment variables and from autodetection against known platforms,
//! pads or truncates the image to the device size and pipes it into `pjet`.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use pjburn_core::platform::PlatformRegistry;
use std::path::Path;

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_platform_registry(cli.platform_db.as_deref())?;

    if cli.list {
        commands::list::print_capabilities(&registry);
        return Ok(());
    }

    let file = cli.file.as_deref().ok_or("need a file to work on")?;
    commands::burn::run_burn(cli, file, &registry)
}

/// Built-in platforms, plus any from a user supplied database
fn load_platform_registry(path: Option<&Path>) -> Result<PlatformRegistry, Box<dyn std::error::Error>> {
    let registry = PlatformRegistry::builtin();
    match path {
        Some(path) => {
            let registry = registry.with_file(path)?;
            log::debug!("Loaded {} platform definitions", registry.len());
            Ok(registry)
        }
        None => Ok(registry),
    }
}
