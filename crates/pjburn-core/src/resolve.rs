//! Parameter resolution
//!
//! Width, size and swap each come from the first of these that has a value:
//!
//! 1. an explicit command line setting
//! 2. an environment default
//! 3. autodetection from the image (skipped in manual mode)
//!
//! Explicit settings are never overwritten. A size can only be computed from
//! the image once the width is known; without a width the size stays unset
//! and resolution fails with a missing-parameter error instead of guessing.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::autosize::autodetect_size;
use crate::env::{EnvDefaults, SIZE_VAR, SWAP_VAR, WIDTH_VAR};
use crate::error::{Error, Result};
use crate::platform::{PlatformRegistry, PlatformSpec};
use crate::tables::{legal_sizes, legal_widths, BusWidth, DeviceSize, ImageType};

const TRUE_WORDS: [&str; 5] = ["YES", "Y", "1", "ON", "TRUE"];
const FALSE_WORDS: [&str; 5] = ["NO", "N", "0", "OFF", "FALSE"];

/// Parse a swap setting (`on`, `off`, `yes`, `no`, `1`, `0`, ...)
pub fn parse_swap(s: &str) -> Result<bool> {
    let upper = s.to_ascii_uppercase();
    if TRUE_WORDS.contains(&upper.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&upper.as_str()) {
        Ok(false)
    } else {
        Err(Error::InvalidSwap {
            value: s.to_string(),
            legal: TRUE_WORDS
                .iter()
                .chain(FALSE_WORDS.iter())
                .map(|w| w.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Parse a hex fill byte, with or without `0x`
pub fn parse_fill(s: &str) -> Result<u8> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if hex.is_empty() || hex.starts_with('+') {
        return Err(Error::InvalidFill(s.to_string()));
    }
    u8::from_str_radix(hex, 16).map_err(|_| Error::InvalidFill(s.to_string()))
}

/// Which Promjet to use when several are attached, counting from 1
///
/// Numbering follows the order `lsusb` lists the devices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIndex(NonZeroU32);

impl DeviceIndex {
    /// Create an index, rejecting 0
    pub fn new(index: u32) -> Option<Self> {
        NonZeroU32::new(index).map(Self)
    }

    /// Numeric value
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for DeviceIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::InvalidDevice(s.to_string()))
    }
}

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings given explicitly by the user
#[derive(Debug, Clone)]
pub struct Settings {
    /// Device size
    pub size: Option<DeviceSize>,
    /// Bus width
    pub width: Option<BusWidth>,
    /// Byte swapping on transfer
    pub swap: Option<bool>,
    /// Byte used to pad the image
    pub fill: u8,
    /// Promjet to use when several are attached
    pub device: Option<DeviceIndex>,
    /// Image format
    pub image_type: ImageType,
    /// Pass the image through without padding or truncation
    pub no_padding: bool,
    /// Disable all autodetection
    pub manual_mode: bool,
    /// Leave the ICE feature enabled
    pub enable_ice: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            size: None,
            width: None,
            swap: None,
            fill: 0xFF,
            device: None,
            image_type: ImageType::default(),
            no_padding: false,
            manual_mode: false,
            enable_ice: false,
        }
    }
}

/// Fully resolved parameter set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Device size
    pub size: DeviceSize,
    /// Bus width
    pub width: BusWidth,
    /// Byte swapping; `None` when no tier provided a value
    pub swap: Option<bool>,
    /// Byte used to pad the image
    pub fill: u8,
    /// Promjet to use when several are attached
    pub device: Option<DeviceIndex>,
    /// Image format
    pub image_type: ImageType,
    /// Whether the image is shaped to the device size
    pub padding: bool,
    /// Leave the ICE feature enabled
    pub enable_ice: bool,
}

impl ResolvedConfig {
    /// Emulated memory size in bytes
    pub fn device_bytes(&self) -> u64 {
        self.size.bytes(self.width)
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Command line
    Explicit,
    /// Environment variable
    Environment,
    /// Platform registry entry
    Platform,
    /// Computed from the image length
    Autosize,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Explicit => "explicit",
            Source::Environment => "environment",
            Source::Platform => "platform",
            Source::Autosize => "autosize",
        })
    }
}

/// Non-fatal problems found while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An environment default holds an unsupported value and was ignored
    InvalidEnvValue {
        /// Variable name
        var: &'static str,
        /// Its value
        value: String,
        /// Legal values
        legal: String,
    },
    /// No width was known, so the size could not be computed from the image
    AutosizeSkipped,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InvalidEnvValue { var, value, legal } => {
                write!(f, "{} of {} not a supported setting ({})", var, value, legal)
            }
            Warning::AutosizeSkipped => write!(
                f,
                "unable to autosize from input file because we don't have a bus width"
            ),
        }
    }
}

/// Provenance of each tiered field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sources {
    /// Where the width came from
    pub width: Option<Source>,
    /// Where the size came from
    pub size: Option<Source>,
    /// Where the swap setting came from
    pub swap: Option<Source>,
}

/// Outcome of [`resolve`]
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved parameters
    pub config: ResolvedConfig,
    /// Name of the detected platform
    pub platform: Option<String>,
    /// Provenance of width, size and swap
    pub sources: Sources,
    /// Non-fatal problems, already logged
    pub warnings: Vec<Warning>,
}

/// Pick the first present value across the three tiers
///
/// Lower tiers are only evaluated when every tier above came up empty.
pub fn pick<T>(
    explicit: Option<T>,
    env: impl FnOnce() -> Option<T>,
    detected: impl FnOnce() -> Option<(T, Source)>,
) -> Option<(T, Source)> {
    if let Some(value) = explicit {
        return Some((value, Source::Explicit));
    }
    if let Some(value) = env() {
        return Some((value, Source::Environment));
    }
    detected()
}

/// Validate an environment value, recording a warning when it is unusable
fn env_value<T>(
    var: &'static str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T>,
    legal: impl FnOnce() -> String,
    warnings: &mut Vec<Warning>,
) -> Option<T> {
    let raw = raw?;
    match parse(raw) {
        Ok(value) => {
            log::debug!("Using {} from {}", raw, var);
            Some(value)
        }
        Err(_) => {
            let warning = Warning::InvalidEnvValue {
                var,
                value: raw.to_string(),
                legal: legal(),
            };
            log::warn!("{}", warning);
            warnings.push(warning);
            None
        }
    }
}

/// Merge explicit settings, environment defaults and autodetection
///
/// `filename` is the input path, or `None` for stdin. `data` is the image
/// as read, used for platform detection and autosizing.
pub fn resolve(
    settings: &Settings,
    env: &EnvDefaults,
    registry: &PlatformRegistry,
    filename: Option<&str>,
    data: &[u8],
) -> Result<Resolution> {
    let mut warnings = Vec::new();

    let platform: Option<&PlatformSpec> = if settings.manual_mode {
        None
    } else {
        registry.detect(filename, data)
    };
    if let Some(p) = platform {
        log::debug!("Autodetection found platform: {}", p.name);
    }

    let width = pick(
        settings.width,
        || {
            env_value(
                WIDTH_VAR,
                env.width.as_deref(),
                str::parse::<BusWidth>,
                legal_widths,
                &mut warnings,
            )
        },
        || platform.map(|p| (p.width, Source::Platform)),
    );

    let size = pick(
        settings.size,
        || {
            env_value(
                SIZE_VAR,
                env.size.as_deref(),
                DeviceSize::lookup,
                legal_sizes,
                &mut warnings,
            )
        },
        || {
            if settings.manual_mode {
                return None;
            }
            if let Some(size) = platform.and_then(|p| p.size) {
                return Some((size, Source::Platform));
            }
            let (width, _) = width?;
            Some((autodetect_size(data.len() as u64, width), Source::Autosize))
        },
    );

    if size.is_none() && width.is_none() && !settings.manual_mode {
        let warning = Warning::AutosizeSkipped;
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    let swap = pick(
        settings.swap,
        || {
            env_value(
                SWAP_VAR,
                env.swap.as_deref(),
                parse_swap,
                || "on, off, yes, no, 1, 0".to_string(),
                &mut warnings,
            )
        },
        || platform.map(|p| (p.swap, Source::Platform)),
    );

    let (size, size_source) = size.ok_or(Error::MissingParameter("size"))?;
    let (width, width_source) = width.ok_or(Error::MissingParameter("width"))?;

    log::debug!("Width {} ({})", width, width_source);
    log::debug!("Size {} ({})", size, size_source);
    if let Some((swap, source)) = swap {
        log::debug!("Swap {} ({})", swap, source);
    }

    Ok(Resolution {
        config: ResolvedConfig {
            size,
            width,
            swap: swap.map(|(v, _)| v),
            fill: settings.fill,
            device: settings.device,
            image_type: settings.image_type,
            padding: !settings.no_padding,
            enable_ice: settings.enable_ice,
        },
        platform: platform.map(|p| p.name.clone()),
        sources: Sources {
            width: Some(width_source),
            size: Some(size_source),
            swap: swap.map(|(_, s)| s),
        },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(width: Option<&str>, size: Option<&str>, swap: Option<&str>) -> EnvDefaults {
        EnvDefaults {
            width: width.map(String::from),
            size: size.map(String::from),
            swap: swap.map(String::from),
        }
    }

    fn size(label: &str) -> DeviceSize {
        DeviceSize::lookup(label).unwrap()
    }

    #[test]
    fn test_parse_swap() {
        for word in ["yes", "Y", "1", "on", "TRUE"] {
            assert!(parse_swap(word).unwrap());
        }
        for word in ["no", "n", "0", "Off", "false"] {
            assert!(!parse_swap(word).unwrap());
        }
        let err = parse_swap("maybe").unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_parse_fill() {
        assert_eq!(parse_fill("0xFF").unwrap(), 0xFF);
        assert_eq!(parse_fill("0x41").unwrap(), 0x41);
        assert_eq!(parse_fill("a5").unwrap(), 0xA5);
        assert_eq!(parse_fill("0X0").unwrap(), 0);
        for bad in ["", "0x", "0x100", "zz", "+1", "-1"] {
            assert!(matches!(parse_fill(bad), Err(Error::InvalidFill(_))), "{}", bad);
        }
    }

    #[test]
    fn test_device_index() {
        assert_eq!("2".parse::<DeviceIndex>().unwrap().get(), 2);
        for bad in ["0", "-1", "two", ""] {
            let err = bad.parse::<DeviceIndex>().unwrap_err();
            assert!(err.to_string().contains("Must be between 1 and n"));
        }
    }

    #[test]
    fn test_pick_order() {
        assert_eq!(
            pick(Some(1), || Some(2), || Some((3, Source::Platform))),
            Some((1, Source::Explicit))
        );
        assert_eq!(
            pick(None, || Some(2), || Some((3, Source::Platform))),
            Some((2, Source::Environment))
        );
        assert_eq!(
            pick(None, || None, || Some((3, Source::Platform))),
            Some((3, Source::Platform))
        );
        assert_eq!(pick::<u8>(None, || None, || None), None);
    }

    #[test]
    fn test_pick_is_lazy() {
        let result = pick(
            Some(1),
            || -> Option<i32> { panic!("env consulted") },
            || -> Option<(i32, Source)> { panic!("detection consulted") },
        );
        assert_eq!(result, Some((1, Source::Explicit)));
    }

    #[test]
    fn test_explicit_never_overwritten() {
        let reg = PlatformRegistry::builtin();
        let explicit = Settings {
            size: Some(size("64K")),
            width: Some(BusWidth::W32),
            swap: Some(false),
            ..Default::default()
        };

        // every combination of environment and platform tiers
        let envs = [
            env(None, None, None),
            env(Some("8"), Some("1M"), Some("on")),
        ];
        let names = [Some("image.bin"), Some("u-boot-octeon_maple.bin")];

        for e in &envs {
            for name in names {
                let r = resolve(&explicit, e, &reg, name, &[0; 16]).unwrap();
                assert_eq!(r.config.width, BusWidth::W32);
                assert_eq!(r.config.size.label, "64K");
                assert_eq!(r.config.swap, Some(false));
                assert_eq!(r.sources.width, Some(Source::Explicit));
                assert_eq!(r.sources.size, Some(Source::Explicit));
                assert_eq!(r.sources.swap, Some(Source::Explicit));
            }
        }
    }

    #[test]
    fn test_env_beats_platform() {
        let reg = PlatformRegistry::builtin();
        let e = env(Some("32"), Some("2M"), Some("no"));
        let r = resolve(&Settings::default(), &e, &reg, Some("maple.bin"), &[]).unwrap();
        assert_eq!(r.platform.as_deref(), Some("maple"));
        assert_eq!(r.config.width, BusWidth::W32);
        assert_eq!(r.config.size.label, "2M");
        assert_eq!(r.config.swap, Some(false));
        assert_eq!(r.sources.width, Some(Source::Environment));
    }

    #[test]
    fn test_invalid_env_is_warning() {
        let reg = PlatformRegistry::builtin();
        let e = env(Some("12"), Some("3M"), Some("sideways"));
        let r = resolve(&Settings::default(), &e, &reg, Some("maple.bin"), &[0; 100]).unwrap();

        assert_eq!(r.warnings.len(), 3);
        assert!(matches!(
            &r.warnings[0],
            Warning::InvalidEnvValue { var: WIDTH_VAR, .. }
        ));
        assert!(r.warnings[0].to_string().contains("1, 8, 16, 32, 64, 128"));
        // fell through to the platform
        assert_eq!(r.config.width, BusWidth::W16);
        assert_eq!(r.config.swap, Some(true));
        assert_eq!(r.config.size.label, "8K");
        assert_eq!(r.sources.size, Some(Source::Autosize));
    }

    #[test]
    fn test_env_size_is_case_normalized() {
        let reg = PlatformRegistry::builtin();
        let e = env(Some("8"), Some("512k"), None);
        let r = resolve(&Settings::default(), &e, &reg, None, &[]).unwrap();
        assert_eq!(r.config.size.label, "512K");
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_platform_size_beats_autosize() {
        let reg = PlatformRegistry::builtin();
        let r = resolve(
            &Settings::default(),
            &EnvDefaults::default(),
            &reg,
            Some("uboot-mvebu-spi.bin"),
            &[0; 10],
        )
        .unwrap();
        assert_eq!(r.config.width, BusWidth::Serial);
        assert_eq!(r.config.size.label, "16M");
        assert_eq!(r.sources.size, Some(Source::Platform));
    }

    #[test]
    fn test_autosize_without_platform() {
        let reg = PlatformRegistry::builtin();
        let settings = Settings {
            width: Some(BusWidth::W16),
            ..Default::default()
        };
        let data = vec![0u8; 300_000];
        let r = resolve(&settings, &EnvDefaults::default(), &reg, Some("image.bin"), &data)
            .unwrap();
        assert_eq!(r.platform, None);
        assert_eq!(r.config.size.label, "256K");
        assert_eq!(r.sources.size, Some(Source::Autosize));
        assert_eq!(r.config.swap, None);
    }

    #[test]
    fn test_missing_width_skips_autosize() {
        let reg = PlatformRegistry::builtin();
        let err = resolve(
            &Settings::default(),
            &EnvDefaults::default(),
            &reg,
            Some("image.bin"),
            &[0; 10],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("size")));
        assert_eq!(err.to_string(), "missing mandatory parameter: device size");
    }

    #[test]
    fn test_missing_width_with_explicit_size() {
        let reg = PlatformRegistry::builtin();
        let settings = Settings {
            size: Some(size("1M")),
            ..Default::default()
        };
        let err = resolve(&settings, &EnvDefaults::default(), &reg, Some("image.bin"), &[])
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("width")));
    }

    #[test]
    fn test_manual_mode_disables_detection() {
        let reg = PlatformRegistry::builtin();
        let settings = Settings {
            width: Some(BusWidth::W8),
            manual_mode: true,
            ..Default::default()
        };
        let err = resolve(
            &settings,
            &EnvDefaults::default(),
            &reg,
            Some("u-boot-octeon_maple.bin"),
            &[0; 10],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("size")));

        // environment still applies in manual mode
        let e = env(None, Some("1M"), None);
        let r = resolve(&settings, &e, &reg, Some("u-boot-octeon_maple.bin"), &[]).unwrap();
        assert_eq!(r.platform, None);
        assert_eq!(r.config.size.label, "1M");
        assert_eq!(r.config.swap, None);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_passthrough_fields() {
        let reg = PlatformRegistry::builtin();
        let settings = Settings {
            size: Some(size("1M")),
            width: Some(BusWidth::W8),
            fill: 0x41,
            device: DeviceIndex::new(3),
            image_type: ImageType::Motorola,
            no_padding: true,
            enable_ice: true,
            ..Default::default()
        };
        let r = resolve(&settings, &EnvDefaults::default(), &reg, None, &[]).unwrap();
        assert_eq!(r.config.fill, 0x41);
        assert_eq!(r.config.device.map(DeviceIndex::get), Some(3));
        assert_eq!(r.config.image_type, ImageType::Motorola);
        assert!(!r.config.padding);
        assert!(r.config.enable_ice);
        assert_eq!(r.config.device_bytes(), 1024 * 1024);
    }
}
