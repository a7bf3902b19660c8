//! pjburn-core - Parameter resolution and image shaping for the Promjet burner
//!
//! The `pjet` tool that programs a Promjet memory emulator is sensitive to
//! image size and geometry. This crate decides the bus width, device size and
//! swap setting for an arbitrary image, shapes the image to exactly the size
//! the emulated device expects, and renders the `pjet` option string.
//!
//! # Pipeline
//!
//! ```text
//! image bytes ─┬─> platform::detect ─┐
//!              │                     ├─> resolve::resolve ─> ResolvedConfig
//! flags, env ──┼─────────────────────┘          │
//!              │                                ├─> compose::compose
//!              └────────────> shape::shape <────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pjburn_core::{compose, env, image, platform, resolve, shape};
//!
//! let image = image::read_image(&image::ImageSource::Path("u-boot.bin".into()))?;
//! let registry = platform::PlatformRegistry::builtin();
//! let env = env::EnvDefaults::from_source(&env::ProcessEnv);
//! let resolution = resolve::resolve(&resolve::Settings::default(), &env, &registry, Some("u-boot.bin"), &image.data)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod autosize;
pub mod compose;
pub mod env;
pub mod error;
pub mod image;
pub mod metric;
pub mod platform;
pub mod resolve;
pub mod shape;
pub mod tables;

pub use error::{Error, Result};
