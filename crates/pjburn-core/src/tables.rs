//! Capability tables
//!
//! Static descriptions of what the Promjet and `pjet` accept: device sizes
//! (with the size code `pjet` expects), bus widths and image types.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::metric;

/// One entry of the device size table
///
/// `locations` is the number of addressable memory locations, not bytes.
/// Multiply by the bytes per location of the bus width to get the emulated
/// memory size in bytes. For a 16 bit bus: 1024K locations * 2 = 2048 KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSize {
    /// Canonical metric label (`512K`, `2M`)
    pub label: &'static str,
    /// Number of memory locations
    pub locations: u64,
    /// Size argument passed to `pjet` in the `I=` option
    pub code: u32,
}

const K: u64 = 1024;
const M: u64 = 1024 * 1024;

/// All device sizes `pjet` knows about
pub const DEVICE_SIZES: &[DeviceSize] = &[
    DeviceSize { label: "8K", locations: 8 * K, code: 64 },
    DeviceSize { label: "16K", locations: 16 * K, code: 128 },
    DeviceSize { label: "32K", locations: 32 * K, code: 256 },
    DeviceSize { label: "64K", locations: 64 * K, code: 512 },
    DeviceSize { label: "128K", locations: 128 * K, code: 10 },
    DeviceSize { label: "256K", locations: 256 * K, code: 20 },
    DeviceSize { label: "512K", locations: 512 * K, code: 40 },
    DeviceSize { label: "1M", locations: M, code: 80 },
    // 16 also works
    DeviceSize { label: "2M", locations: 2 * M, code: 160 },
    // 32 also works
    DeviceSize { label: "4M", locations: 4 * M, code: 320 },
    DeviceSize { label: "8M", locations: 8 * M, code: 640 },
    DeviceSize { label: "16M", locations: 16 * M, code: 1280 },
    DeviceSize { label: "32M", locations: 32 * M, code: 2560 },
];

impl DeviceSize {
    /// Look up a size label, ignoring case
    pub fn lookup(label: &str) -> Result<Self> {
        let normalized = label.to_ascii_uppercase();
        DEVICE_SIZES
            .iter()
            .find(|s| s.label == normalized)
            .copied()
            .ok_or_else(|| Error::InvalidSize {
                value: normalized,
                legal: legal_sizes(),
            })
    }

    /// Emulated memory size in bytes at the given bus width
    pub fn bytes(&self, width: BusWidth) -> u64 {
        self.locations * width.bytes_per_location()
    }
}

impl FromStr for DeviceSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
    }
}

impl fmt::Display for DeviceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Comma-separated size labels, smallest first
pub fn legal_sizes() -> String {
    metric::format_all().join(", ")
}

/// Promjet bus width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusWidth {
    /// Serial (SPI) flash, 8 bits per location
    Serial,
    /// 8 bit parallel bus
    W8,
    /// 16 bit parallel bus
    W16,
    /// 32 bit parallel bus
    W32,
    /// 64 bit parallel bus
    W64,
    /// 128 bit parallel bus
    W128,
}

impl BusWidth {
    /// Every width in table order
    pub const ALL: [BusWidth; 6] = [
        BusWidth::Serial,
        BusWidth::W8,
        BusWidth::W16,
        BusWidth::W32,
        BusWidth::W64,
        BusWidth::W128,
    ];

    /// Width value as written on the command line (`1` for serial)
    pub fn bits(self) -> u32 {
        match self {
            BusWidth::Serial => 1,
            BusWidth::W8 => 8,
            BusWidth::W16 => 16,
            BusWidth::W32 => 32,
            BusWidth::W64 => 64,
            BusWidth::W128 => 128,
        }
    }

    /// Bytes held by one memory location. Serial counts as an 8 bit bus.
    pub fn bytes_per_location(self) -> u64 {
        match self {
            BusWidth::Serial => 1,
            other => u64::from(other.bits() / 8),
        }
    }

    /// Whether this is the serial/SPI pseudo width
    pub fn is_serial(self) -> bool {
        self == BusWidth::Serial
    }

    /// Look up a width from its numeric value
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.bits() == bits)
    }
}

impl FromStr for BusWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u32>()
            .ok()
            .and_then(Self::from_bits)
            .ok_or_else(|| Error::InvalidWidth {
                value: s.to_string(),
                legal: legal_widths(),
            })
    }
}

impl fmt::Display for BusWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Comma-separated width values
pub fn legal_widths() -> String {
    BusWidth::ALL
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Image format understood by `pjet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageType {
    /// Intel hex
    Intel,
    /// Raw binary
    #[default]
    Binary,
    /// Motorola S-record
    Motorola,
}

impl ImageType {
    /// Every image type in table order
    pub const ALL: [ImageType; 3] = [ImageType::Intel, ImageType::Binary, ImageType::Motorola];

    /// Letter used in the `T=` option
    pub fn letter(self) -> char {
        match self {
            ImageType::Intel => 'I',
            ImageType::Binary => 'B',
            ImageType::Motorola => 'M',
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ImageType::Intel => "Intel",
            ImageType::Binary => "Binary",
            ImageType::Motorola => "Motorola",
        }
    }
}

impl FromStr for ImageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let found = match (chars.next(), chars.next()) {
            (Some(c), None) => Self::ALL
                .into_iter()
                .find(|t| t.letter() == c.to_ascii_uppercase()),
            _ => None,
        };
        found.ok_or_else(|| Error::InvalidImageType {
            value: s.to_string(),
            legal: legal_image_types(),
        })
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Image types as `I=Intel, B=Binary, M=Motorola`
pub fn legal_image_types() -> String {
    ImageType::ALL
        .iter()
        .map(|t| format!("{}={}", t.letter(), t.name()))
        .collect::<Vec<_>>()
        .join(", ")
}
