//! Device size autodetection
//!
//! Picks the smallest device that holds a whole image at a given bus width.

use crate::metric;
use crate::tables::{BusWidth, DeviceSize};

/// Number of memory locations needed to hold `byte_len` bytes
pub fn required_locations(byte_len: u64, width: BusWidth) -> u64 {
    byte_len.div_ceil(width.bytes_per_location())
}

/// Smallest device size whose capacity covers `byte_len` bytes
///
/// When the image is larger than every device the largest size is returned;
/// the caller will see the truncation when the image is shaped.
pub fn autodetect_size(byte_len: u64, width: BusWidth) -> DeviceSize {
    let needed = required_locations(byte_len, width);
    metric::sorted_sizes()
        .into_iter()
        .find(|s| s.locations >= needed)
        .unwrap_or_else(metric::max_size)
}
