//! Image shaping
//!
//! `pjet` has a much easier time when the image is exactly the size of the
//! memory it emulates. Images are truncated or padded with the fill byte to
//! match the device.

use crate::resolve::ResolvedConfig;

/// What [`shape`] did to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeOutcome {
    /// Already the right size, or padding disabled
    Unchanged,
    /// Fill bytes appended
    Padded(u64),
    /// Bytes dropped from the tail
    Truncated(u64),
}

/// Truncate or pad `data` to exactly `target` bytes
pub fn shape_to(data: &mut Vec<u8>, target: u64, fill: u8) -> ShapeOutcome {
    let current = data.len() as u64;
    if current > target {
        log::warn!("input file larger than device - truncating data to fit");
        data.truncate(target as usize);
        ShapeOutcome::Truncated(current - target)
    } else if current < target {
        let pad = target - current;
        log::debug!("Padding data with {} bytes of pattern 0x{:02X}", pad, fill);
        data.resize(target as usize, fill);
        ShapeOutcome::Padded(pad)
    } else {
        ShapeOutcome::Unchanged
    }
}

/// Shape `data` for the resolved device
///
/// With padding disabled the buffer is left untouched whatever its size.
pub fn shape(data: &mut Vec<u8>, config: &ResolvedConfig) -> ShapeOutcome {
    if !config.padding {
        return ShapeOutcome::Unchanged;
    }
    shape_to(data, config.device_bytes(), config.fill)
}
