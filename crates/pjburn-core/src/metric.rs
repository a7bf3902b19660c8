//! Metric size strings
//!
//! Converts strings like `256K` or `2M` to raw counts and back. Suffixes are
//! binary multiples: K = 1024, M = 1024², G = 1024³.

use crate::error::{Error, Result};
use crate::tables::{DeviceSize, DEVICE_SIZES};

/// Recognized suffixes, largest first
const SUFFIXES: [(char, u64); 3] = [
    ('G', 1024 * 1024 * 1024),
    ('M', 1024 * 1024),
    ('K', 1024),
];

fn suffix_multiplier(suffix: char) -> Option<u64> {
    let suffix = suffix.to_ascii_uppercase();
    SUFFIXES
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, mult)| *mult)
}

/// Parse a metric string into a raw count
///
/// A trailing letter must be one of K/M/G (any case). Without a trailing
/// letter the whole string must be a decimal integer.
pub fn parse(text: &str) -> Result<u64> {
    let invalid = |reason: String| Error::InvalidFormat {
        input: text.to_string(),
        reason,
    };

    let last = text
        .chars()
        .last()
        .ok_or_else(|| invalid("empty string cannot be converted to a number".into()))?;

    if !last.is_alphabetic() {
        return text
            .parse::<u64>()
            .map_err(|_| invalid("not a number".into()));
    }

    let multiplier = suffix_multiplier(last).ok_or_else(|| {
        invalid(format!(
            "unknown suffix {} (K, M, G)",
            last.to_uppercase()
        ))
    })?;

    let prefix = &text[..text.len() - last.len_utf8()];
    let number = prefix
        .parse::<u64>()
        .map_err(|_| invalid(format!("'{}' is not a number", prefix)))?;

    number
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("value too large".into()))
}

/// Format a raw count using the largest suffix that divides it exactly
pub fn format(count: u64) -> String {
    for (suffix, mult) in SUFFIXES {
        if count != 0 && count % mult == 0 {
            return format!("{}{}", count / mult, suffix);
        }
    }
    count.to_string()
}

/// Device sizes sorted by capacity, smallest first
pub fn sorted_sizes() -> Vec<DeviceSize> {
    let mut sizes = DEVICE_SIZES.to_vec();
    sizes.sort_by_key(|s| s.locations);
    sizes
}

/// Every valid size label, smallest first
pub fn format_all() -> Vec<&'static str> {
    sorted_sizes().into_iter().map(|s| s.label).collect()
}

/// Largest device size in the table
pub fn max_size() -> DeviceSize {
    DEVICE_SIZES
        .iter()
        .copied()
        .max_by_key(|s| s.locations)
        .unwrap_or(DEVICE_SIZES[0])
}

/// Label of the largest device size
pub fn max_label() -> &'static str {
    max_size().label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse("256K").unwrap(), 256 * 1024);
        assert_eq!(parse("2M").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse("512k").unwrap(), 512 * 1024);
        assert_eq!(parse("4096").unwrap(), 4096);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "K256", "K", "12X", "1.5M", " 2M", "M2M", "-1K"] {
            assert!(
                matches!(parse(bad), Err(Error::InvalidFormat { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        assert!(parse("18446744073709551615G").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format(256 * 1024), "256K");
        assert_eq!(format(2 * 1024 * 1024), "2M");
        assert_eq!(format(3 * 1024 * 1024 * 1024), "3G");
        assert_eq!(format(1536), "1536");
        assert_eq!(format(0), "0");
        assert_eq!(format(1024 * 1024 + 1024), "1025K");
    }

    #[test]
    fn test_round_trip() {
        for text in ["8K", "100K", "3M", "2G", "1023K", "1024K", "4096", "1536"] {
            let count = parse(text).unwrap();
            assert_eq!(parse(&format(count)).unwrap(), count, "{}", text);
        }
    }

    #[test]
    fn test_format_all_sorted() {
        let labels = format_all();
        assert_eq!(labels.first(), Some(&"8K"));
        assert_eq!(labels.last(), Some(&"32M"));
        let counts: Vec<u64> = labels.iter().map(|l| parse(l).unwrap()).collect();
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_max_label() {
        assert_eq!(max_label(), "32M");
        assert_eq!(max_size().locations, 32 * 1024 * 1024);
    }
}
