//! CLI command implementations
//!
//! `burn` runs the whole pipeline: read, resolve, shape, compose and hand the
//! result to `pjet`. `list` prints the capability tables.

pub mod burn;
pub mod list;
