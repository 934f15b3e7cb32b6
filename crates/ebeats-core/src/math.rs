//! Sample-format math shared by every unit.
//!
//! All units render signed 16-bit samples and compute in `f64`. This module
//! holds the conversions between the two, the sub-block grid used to re-read
//! control values, and buffer inspection helpers.
//!
//! # Sample Conversion
//!
//! - [`to_sample`] - `f64` to `i16`, truncating toward zero and saturating
//! - [`saturate`] - `i32` to `i16`, saturating
//!
//! # Control Grid
//!
//! - [`INNER_LOOP`] - control values are re-read once per this many samples
//! - [`sub_blocks`] - split a buffer on the absolute [`INNER_LOOP`] grid
//!
//! # Buffer Inspection
//!
//! - [`is_silent`] / [`peak`] - cheap scans used for gap detection

use core::ops::Range;

/// Number of samples between two control-value reads.
///
/// Envelope-bound parameters are sampled at the first sample of each
/// sub-block and held for the rest of it.
pub const INNER_LOOP: usize = 64;

/// Smallest representable sample value.
pub const SAMPLE_MIN: i16 = i16::MIN;

/// Largest representable sample value.
pub const SAMPLE_MAX: i16 = i16::MAX;

/// Sample rate assumed until a host calls `setup()`.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Convert a float sample to `i16`.
///
/// Truncates toward zero and saturates to `[-32768, 32767]`. NaN maps to 0.
///
/// # Example
///
/// ```rust
/// use ebeats_core::to_sample;
///
/// assert_eq!(to_sample(1234.9), 1234);
/// assert_eq!(to_sample(-1234.9), -1234);
/// assert_eq!(to_sample(40_000.0), 32767);
/// assert_eq!(to_sample(f64::NAN), 0);
/// ```
#[inline]
pub fn to_sample(x: f64) -> i16 {
    if x.is_nan() {
        0
    } else if x >= f64::from(SAMPLE_MAX) {
        SAMPLE_MAX
    } else if x <= f64::from(SAMPLE_MIN) {
        SAMPLE_MIN
    } else {
        x as i16
    }
}

/// Saturate a widened integer sample back to `i16`.
#[inline]
pub fn saturate(x: i32) -> i16 {
    x.clamp(i32::from(SAMPLE_MIN), i32::from(SAMPLE_MAX)) as i16
}

/// Flush values in the subnormal range to zero.
///
/// Used on filter memory between buffers so a decaying tail does not leave
/// the integrators crawling through denormals.
#[inline]
pub fn flush_denormal(x: f64) -> f64 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Split `count` samples starting at absolute sample `offset` into ranges
/// that end on multiples of [`INNER_LOOP`].
///
/// Each range comes with the absolute offset of the grid point it belongs
/// to. Control values are read there, so a short leading range reads the
/// same value the samples would get in one unsplit pass.
///
/// # Example
///
/// ```rust
/// use ebeats_core::sub_blocks;
///
/// let blocks: Vec<_> = sub_blocks(60, 80).collect();
/// assert_eq!(blocks, vec![(0, 0..4), (64, 4..68), (128, 68..80)]);
/// ```
pub fn sub_blocks(offset: u64, count: usize) -> impl Iterator<Item = (u64, Range<usize>)> {
    let grid = INNER_LOOP as u64;
    let mut anchor = offset - offset % grid;
    let mut start = 0;
    let mut next_len = (anchor + grid - offset) as usize;
    core::iter::from_fn(move || {
        if start >= count {
            return None;
        }
        let end = (start + next_len).min(count);
        let block = (anchor, start..end);
        start = end;
        anchor += grid;
        next_len = INNER_LOOP;
        Some(block)
    })
}

/// Returns `true` when every sample is zero.
#[inline]
pub fn is_silent(samples: &[i16]) -> bool {
    samples.iter().all(|&s| s == 0)
}

/// Largest absolute sample value, saturated to `i16::MAX`.
pub fn peak(samples: &[i16]) -> i16 {
    samples
        .iter()
        .map(|s| s.saturating_abs())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sample_truncates_toward_zero() {
        assert_eq!(to_sample(0.99), 0);
        assert_eq!(to_sample(-0.99), 0);
        assert_eq!(to_sample(100.7), 100);
        assert_eq!(to_sample(-100.7), -100);
    }

    #[test]
    fn test_to_sample_saturates() {
        assert_eq!(to_sample(32767.5), SAMPLE_MAX);
        assert_eq!(to_sample(1e12), SAMPLE_MAX);
        assert_eq!(to_sample(-32768.0), SAMPLE_MIN);
        assert_eq!(to_sample(-1e12), SAMPLE_MIN);
        assert_eq!(to_sample(f64::INFINITY), SAMPLE_MAX);
        assert_eq!(to_sample(f64::NEG_INFINITY), SAMPLE_MIN);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(40_000), 32767);
        assert_eq!(saturate(-40_000), -32768);
        assert_eq!(saturate(-5), -5);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(-1e-30), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }

    #[test]
    fn test_sub_blocks_aligned_start() {
        let blocks: Vec<_> = sub_blocks(0, 150).collect();
        assert_eq!(blocks, vec![(0, 0..64), (64, 64..128), (128, 128..150)]);
    }

    #[test]
    fn test_sub_blocks_unaligned_start() {
        let blocks: Vec<_> = sub_blocks(130, 10).collect();
        assert_eq!(blocks, vec![(128, 0..10)], "stays inside the 128..192 block");

        let blocks: Vec<_> = sub_blocks(190, 10).collect();
        assert_eq!(blocks, vec![(128, 0..2), (192, 2..10)]);
    }

    #[test]
    fn test_sub_blocks_anchor_on_the_grid() {
        for offset in [1u64, 63, 100, 4097] {
            for (at, block) in sub_blocks(offset, 300) {
                assert_eq!(at % INNER_LOOP as u64, 0, "offset {offset}");
                let first = offset + block.start as u64;
                assert!(first >= at && first < at + INNER_LOOP as u64);
            }
        }
    }

    #[test]
    fn test_sub_blocks_empty() {
        assert_eq!(sub_blocks(17, 0).count(), 0);
    }

    #[test]
    fn test_sub_blocks_cover_every_sample_once() {
        for offset in [0u64, 1, 63, 64, 65, 1000] {
            for count in [1usize, 63, 64, 65, 257] {
                let total: usize = sub_blocks(offset, count).map(|(_, r)| r.len()).sum();
                assert_eq!(total, count, "offset {offset} count {count}");
            }
        }
    }

    #[test]
    fn test_silence_and_peak() {
        assert!(is_silent(&[0; 16]));
        assert!(!is_silent(&[0, 0, 1]));
        assert_eq!(peak(&[3, -7, 5]), 7);
        assert_eq!(peak(&[i16::MIN]), i16::MAX);
        assert_eq!(peak(&[]), 0);
    }
}
