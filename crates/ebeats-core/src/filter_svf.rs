//! Chamberlin state variable filter on 16-bit buffers.
//!
//! The classic two-integrator loop:
//!
//! ```text
//! high = x - mid * (1 / resonance) - low
//! mid += high * cutoff
//! low += mid * cutoff
//! ```
//!
//! One update yields all outputs at once; [`FilterType`] picks which one
//! is written back. Cutoff is a normalized coefficient in `0..=1` and
//! resonance runs from 0.7 to 25. Over that whole range the loop is
//! stable (`cutoff * damping < 2` and `cutoff² + 2 * cutoff * damping < 4`),
//! and every output sample saturates to `i16`.
//!
//! Like [`OscSynth`](crate::OscSynth) the filter counts samples since its
//! last trigger and can read its cutoff from an [`Envelope`] once per
//! [`INNER_LOOP`](crate::INNER_LOOP) sub-block.

use crate::envelope::Envelope;
use crate::math::{flush_denormal, sub_blocks, to_sample};

/// Lowest accepted resonance.
pub const MIN_RESONANCE: f64 = 0.7;

/// Highest accepted resonance.
pub const MAX_RESONANCE: f64 = 25.0;

/// Filter response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Pass the signal through untouched.
    None,
    /// Low-pass output.
    #[default]
    LowPass,
    /// High-pass output.
    HiPass,
    /// Band-pass output.
    BandPass,
    /// Band-stop (notch) output, low + high.
    BandStop,
}

impl FilterType {
    /// Every filter type in index order.
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::LowPass,
        FilterType::HiPass,
        FilterType::BandPass,
        FilterType::BandStop,
    ];

    /// Stable index of this type.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Type at `index`, or `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable short name.
    pub fn nick(self) -> &'static str {
        match self {
            FilterType::None => "none",
            FilterType::LowPass => "lowpass",
            FilterType::HiPass => "hipass",
            FilterType::BandPass => "bandpass",
            FilterType::BandStop => "bandstop",
        }
    }

    /// Look a type up by its [`nick`](Self::nick).
    pub fn from_nick(nick: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.nick() == nick)
    }
}

/// Resonant state variable filter, processed in place.
///
/// ## Parameters
///
/// - `filter_type`: which output is written (default `LowPass`)
/// - `cutoff`: normalized coefficient (0.0 to 1.0, default 0.8)
/// - `resonance`: 0.7 to 25.0, default 0.8
///
/// # Example
///
/// ```rust
/// use ebeats_core::{FilterSvf, FilterType};
///
/// let mut svf = FilterSvf::new();
/// svf.set_filter_type(FilterType::HiPass);
/// svf.set_cutoff(0.3);
/// svf.set_resonance(2.0);
///
/// let mut buf = [8000i16; 512];
/// svf.process(&mut buf, None);
/// assert!(buf[511].abs() < 100, "DC is blocked");
/// ```
#[derive(Debug, Clone)]
pub struct FilterSvf {
    filter_type: FilterType,
    cutoff: f64,
    resonance: f64,
    /// Damping, `1 / resonance`.
    flt_res: f64,
    low: f64,
    mid: f64,
    high: f64,
    /// Samples processed since the last trigger.
    offset: u64,
}

impl Default for FilterSvf {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterSvf {
    /// Create a low-pass filter with cutoff 0.8 and resonance 0.8.
    pub fn new() -> Self {
        Self {
            filter_type: FilterType::LowPass,
            cutoff: 0.8,
            resonance: 0.8,
            flt_res: 1.0 / 0.8,
            low: 0.0,
            mid: 0.0,
            high: 0.0,
            offset: 0,
        }
    }

    /// Select the output written back to the buffer.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        #[cfg(feature = "tracing")]
        tracing::debug!(filter = filter_type.nick(), "svf type change");
        self.filter_type = filter_type;
    }

    /// Current filter type.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Set the unbound cutoff, clamped to `0.0..=1.0`.
    pub fn set_cutoff(&mut self, cutoff: f64) {
        if !cutoff.is_nan() {
            self.cutoff = cutoff.clamp(0.0, 1.0);
        }
    }

    /// Unbound cutoff.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set resonance, clamped to [`MIN_RESONANCE`]`..=`[`MAX_RESONANCE`].
    pub fn set_resonance(&mut self, resonance: f64) {
        if !resonance.is_nan() {
            self.resonance = resonance.clamp(MIN_RESONANCE, MAX_RESONANCE);
            self.flt_res = 1.0 / self.resonance;
        }
    }

    /// Current resonance.
    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    /// Samples processed since the last trigger.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Clear the filter memory and restart the offset.
    pub fn trigger(&mut self) {
        self.low = 0.0;
        self.mid = 0.0;
        self.high = 0.0;
        self.offset = 0;
    }

    /// Filter `buf` in place.
    ///
    /// With `cutoff_env` the cutoff follows that envelope at this filter's
    /// offset, clamped to `0.0..=1.0`; otherwise the unbound cutoff is used.
    pub fn process(&mut self, buf: &mut [i16], cutoff_env: Option<&Envelope>) {
        if self.filter_type != FilterType::None {
            let (mut low, mut mid, mut high) = (self.low, self.mid, self.high);
            let flt_res = self.flt_res;
            for (at, block) in sub_blocks(self.offset, buf.len()) {
                let cutoff = cutoff_env.map_or(self.cutoff, |env| env.value_at(at).clamp(0.0, 1.0));
                for s in &mut buf[block] {
                    high = f64::from(*s) - mid * flt_res - low;
                    mid += high * cutoff;
                    low += mid * cutoff;
                    *s = to_sample(match self.filter_type {
                        FilterType::LowPass => low,
                        FilterType::HiPass => high,
                        FilterType::BandPass => mid,
                        FilterType::BandStop => low + high,
                        FilterType::None => f64::from(*s),
                    });
                }
            }
            if low.is_finite() && mid.is_finite() && high.is_finite() {
                self.low = flush_denormal(low);
                self.mid = flush_denormal(mid);
                self.high = flush_denormal(high);
            } else {
                self.low = 0.0;
                self.mid = 0.0;
                self.high = 0.0;
            }
        }
        self.offset += buf.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(svf: &mut FilterSvf, value: i16, len: usize) -> Vec<i16> {
        let mut buf = vec![value; len];
        svf.process(&mut buf, None);
        buf
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut svf = FilterSvf::new();
        svf.set_cutoff(0.2);
        svf.set_resonance(1.0);
        let out = run(&mut svf, 10_000, 2000);
        let last = out[1999];
        assert!((i32::from(last) - 10_000).abs() < 50, "DC should pass, got {last}");
    }

    #[test]
    fn test_hipass_blocks_dc() {
        let mut svf = FilterSvf::new();
        svf.set_filter_type(FilterType::HiPass);
        svf.set_cutoff(0.2);
        svf.set_resonance(1.0);
        let out = run(&mut svf, 10_000, 2000);
        assert!(out[1999].abs() < 50, "DC should be blocked, got {}", out[1999]);
    }

    #[test]
    fn test_bandpass_blocks_dc() {
        let mut svf = FilterSvf::new();
        svf.set_filter_type(FilterType::BandPass);
        svf.set_cutoff(0.2);
        svf.set_resonance(1.0);
        let out = run(&mut svf, 10_000, 2000);
        assert!(out[1999].abs() < 50, "got {}", out[1999]);
    }

    #[test]
    fn test_bandstop_passes_dc() {
        let mut svf = FilterSvf::new();
        svf.set_filter_type(FilterType::BandStop);
        svf.set_cutoff(0.2);
        svf.set_resonance(1.0);
        let out = run(&mut svf, 10_000, 2000);
        assert!((i32::from(out[1999]) - 10_000).abs() < 50, "got {}", out[1999]);
    }

    #[test]
    fn test_none_is_pass_through() {
        let mut svf = FilterSvf::new();
        svf.set_filter_type(FilterType::None);
        let input: Vec<i16> = (0..300).map(|i| (i * 97 % 2000) as i16 - 1000).collect();
        let mut buf = input.clone();
        svf.process(&mut buf, None);
        assert_eq!(buf, input);
        assert_eq!(svf.offset(), 300);
    }

    #[test]
    fn test_trigger_clears_memory() {
        let mut svf = FilterSvf::new();
        let first = run(&mut svf, 12_000, 64);
        run(&mut svf, -20_000, 500);
        svf.trigger();
        assert_eq!(svf.offset(), 0);
        let again = run(&mut svf, 12_000, 64);
        assert_eq!(first, again);
    }

    #[test]
    fn test_extreme_settings_stay_bounded() {
        for resonance in [MIN_RESONANCE, 1.0, 5.0, MAX_RESONANCE] {
            for cutoff in [0.0, 0.01, 0.5, 1.0] {
                let mut svf = FilterSvf::new();
                svf.set_cutoff(cutoff);
                svf.set_resonance(resonance);
                let mut buf: Vec<i16> = (0..4096)
                    .map(|i| if (i / 7) % 2 == 0 { i16::MAX } else { i16::MIN })
                    .collect();
                svf.process(&mut buf, None);
                assert!(svf.low.is_finite() && svf.mid.is_finite());
                assert!(
                    svf.low.abs() < 1e8,
                    "cutoff {cutoff} resonance {resonance}: low {}",
                    svf.low
                );
            }
        }
    }

    #[test]
    fn test_setters_clamp() {
        let mut svf = FilterSvf::new();
        svf.set_cutoff(2.0);
        assert_eq!(svf.cutoff(), 1.0);
        svf.set_cutoff(-1.0);
        assert_eq!(svf.cutoff(), 0.0);
        svf.set_resonance(100.0);
        assert_eq!(svf.resonance(), MAX_RESONANCE);
        svf.set_resonance(0.0);
        assert_eq!(svf.resonance(), MIN_RESONANCE);
        svf.set_resonance(f64::NAN);
        assert_eq!(svf.resonance(), MIN_RESONANCE);
    }

    #[test]
    fn test_constant_cutoff_envelope_matches_unbound() {
        let mut env = Envelope::new().with_levels(0.3, 0.3).with_decay(0.5);
        env.setup(44100);
        env.reset();

        let input: Vec<i16> = (0..700).map(|i| ((i * 613) % 30_000) as i16 - 15_000).collect();
        let mut bound = FilterSvf::new();
        let mut unbound = FilterSvf::new();
        unbound.set_cutoff(0.3);

        let mut a = input.clone();
        let mut b = input;
        bound.process(&mut a, Some(&env));
        unbound.process(&mut b, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_closing_cutoff_envelope_darkens() {
        let mut env = Envelope::new().with_levels(1.0, 0.0).with_decay(0.01);
        env.setup(44100);
        env.reset();

        let mut svf = FilterSvf::new();
        svf.set_resonance(1.0);
        let mut buf: Vec<i16> = (0..2048)
            .map(|i| if i % 2 == 0 { 10_000 } else { -10_000 })
            .collect();
        svf.process(&mut buf, Some(&env));
        // Once the cutoff reaches 0 the integrators freeze.
        let tail = &buf[512..];
        assert!(tail.iter().all(|&s| s == tail[0]));
    }

    #[test]
    fn test_cutoff_envelope_is_chunking_invariant() {
        let mut env = Envelope::new().with_levels(0.9, 0.05).with_decay(0.01);
        env.setup(44100);
        env.reset();

        let input: Vec<i16> = (0..600i32).map(|i| ((i * 977) % 40_000 - 20_000) as i16).collect();
        let mut whole = FilterSvf::new();
        whole.set_resonance(0.5);
        let mut split = whole.clone();

        let mut a = input.clone();
        whole.process(&mut a, Some(&env));

        let mut b = input;
        let mut start = 0;
        for len in [10usize, 118, 1, 200, 271] {
            split.process(&mut b[start..start + len], Some(&env));
            start += len;
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_type_tables() {
        for (i, t) in FilterType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
            assert_eq!(FilterType::from_index(i), Some(*t));
            assert_eq!(FilterType::from_nick(t.nick()), Some(*t));
        }
        assert_eq!(FilterType::from_index(5), None);
        assert_eq!(FilterType::default(), FilterType::LowPass);
    }
}
