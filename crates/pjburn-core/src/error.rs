//! Error types for pjburn-core
//!
//! Every variant is fatal: the invocation stops before the burner is touched.
//! Non-fatal conditions (bad environment values, truncation) are reported as
//! warnings by the component that hits them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A metric string such as `256K` could not be parsed
    #[error("invalid metric size '{input}': {reason}")]
    InvalidFormat {
        /// The rejected input
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// Fill byte is not a hex value in 00-FF
    #[error("invalid fill byte '{0}': expected a hex value between 0x00 and 0xFF")]
    InvalidFill(String),

    /// Swap value is not one of the recognized boolean words
    #[error("can't understand swap setting '{value}' ({legal})")]
    InvalidSwap {
        /// The rejected input
        value: String,
        /// Comma-separated legal values
        legal: String,
    },

    /// Device size is not in the size table
    #[error("device size {value} is invalid ({legal})")]
    InvalidSize {
        /// The rejected input
        value: String,
        /// Comma-separated legal values
        legal: String,
    },

    /// Bus width is not in the width table
    #[error("device width {value} is invalid ({legal})")]
    InvalidWidth {
        /// The rejected input
        value: String,
        /// Comma-separated legal values
        legal: String,
    },

    /// Image type letter is not known to the burner
    #[error("image type {value} is invalid ({legal})")]
    InvalidImageType {
        /// The rejected input
        value: String,
        /// Comma-separated legal values
        legal: String,
    },

    /// Device index is not an integer >= 1
    #[error("invalid device number {0}. Must be between 1 and n")]
    InvalidDevice(String),

    /// A mandatory parameter is still unset after all precedence tiers
    #[error("missing mandatory parameter: device {0}")]
    MissingParameter(&'static str),

    /// Reading the input image failed
    #[error("failed to read input {path}: {source}")]
    Image {
        /// Input path (`-` for stdin)
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading a platform registry file failed
    #[error("failed to read platform database {path}: {source}")]
    PlatformDbIo {
        /// Registry file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A platform registry file is malformed
    #[error("invalid platform database: {0}")]
    PlatformDb(String),
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
