//! `pjet` command composition
//!
//! Renders a [`ResolvedConfig`] in `pjet` syntax. Options always come in this
//! order:
//!
//! ```text
//! I=<jumpers><size code> T=<type> [W=<S><width>] F=<fill>|L=<length> [X=<device>]
//! ```
//!
//! Jumper letters: `N` disables ICE, `P` selects a serial (SPI) device. The
//! geometry option is left out for serial devices.

use std::fmt;

use crate::resolve::ResolvedConfig;

/// Burner binary used when none is given
pub const DEFAULT_PROGRAM: &str = "pjet";

/// Trailing argument telling `pjet` to read the image from stdin
pub const STDIN_ARG: &str = "/dev/stdin";

/// Option tokens for `config`
///
/// `data_len` is the unshaped image length; it is only used when padding is
/// disabled and `pjet` has to be told the length explicitly.
pub fn compose(config: &ResolvedConfig, data_len: u64) -> Vec<String> {
    let mut jumpers = String::new();
    if !config.enable_ice {
        jumpers.push('N');
    }
    if config.width.is_serial() {
        jumpers.push('P');
    }

    let mut options = vec![
        format!("I={}{}", jumpers, config.size.code),
        format!("T={}", config.image_type),
    ];

    if !config.width.is_serial() {
        let swap = if config.swap == Some(true) { "S" } else { "" };
        options.push(format!("W={}{}", swap, config.width));
    }

    if config.padding {
        options.push(format!("F={:02X}", config.fill));
    } else {
        options.push(format!("L={:X}", data_len));
    }

    if let Some(device) = config.device {
        options.push(format!("X={}", device));
    }

    options
}

/// Option string for `config`, space separated
pub fn compose_string(config: &ResolvedConfig, data_len: u64) -> String {
    compose(config, data_len).join(" ")
}

/// A complete burner invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnerCommand {
    /// Burner binary
    pub program: String,
    /// Arguments, ending in [`STDIN_ARG`]
    pub args: Vec<String>,
}

impl BurnerCommand {
    /// Build the invocation for `config`, using `program` or [`DEFAULT_PROGRAM`]
    pub fn new(program: Option<&str>, config: &ResolvedConfig, data_len: u64) -> Self {
        let mut args = compose(config, data_len);
        args.push(STDIN_ARG.to_string());
        Self {
            program: program.unwrap_or(DEFAULT_PROGRAM).to_string(),
            args,
        }
    }
}

impl fmt::Display for BurnerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
