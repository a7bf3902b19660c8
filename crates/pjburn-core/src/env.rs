//! Environment defaults
//!
//! Commonly used settings can live in environment variables so they don't
//! have to be given on every invocation. They are read once through
//! [`EnvSource`] and handed to the resolver as plain data.

use std::collections::HashMap;

/// Default bus width
pub const WIDTH_VAR: &str = "PJET_WIDTH";
/// Default device size
pub const SIZE_VAR: &str = "PJET_SIZE";
/// Default swap setting
pub const SWAP_VAR: &str = "PJET_SWAP";

/// Somewhere environment variables can be looked up
pub trait EnvSource {
    /// Value of `name`, or `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Raw, unvalidated default values
///
/// Validation happens in the resolver, which only consults a value when the
/// field is still unset and turns bad values into warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    /// Value of [`WIDTH_VAR`]
    pub width: Option<String>,
    /// Value of [`SIZE_VAR`]
    pub size: Option<String>,
    /// Value of [`SWAP_VAR`]
    pub swap: Option<String>,
}

impl EnvDefaults {
    /// Read all defaults from `source`. Empty values count as unset.
    pub fn from_source(source: &dyn EnvSource) -> Self {
        let read = |name: &str| source.var(name).filter(|v| !v.is_empty());
        Self {
            width: read(WIDTH_VAR),
            size: read(SIZE_VAR),
            swap: read(SWAP_VAR),
        }
    }
}
