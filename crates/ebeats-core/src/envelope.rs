//! One-shot decay envelope.
//!
//! An [`Envelope`] describes a control curve that starts at `peak_level` on a
//! trigger and moves to `floor_level` over `decay` seconds. The same curve
//! drives volume (linear gain), pitch (Hz) and filter cutoff (0..1), so the
//! levels carry no unit of their own.
//!
//! # Reading the curve
//!
//! There are two ways to read an envelope:
//!
//! - [`Envelope::value_at`] evaluates the curve at an absolute sample offset
//!   and takes `&self`. Oscillators and filters use this: they hold a shared
//!   borrow and evaluate at their own offsets, so they can never re-arm or
//!   advance the envelope.
//! - [`Envelope::get`] reads the value for the next sub-block and advances
//!   the envelope's own elapsed counter. Only the owner can call it.
//!
//! # Curve
//!
//! `curve` bends the path between peak and floor. With `t` the elapsed
//! fraction of the decay, the value is
//! `peak + (floor - peak) * t^e` where `e = 2^((curve - 0.5) * 6)`.
//! `curve = 0.5` is a straight line, `0.0` drops steeply right after the
//! trigger and `1.0` holds near the peak before falling late. Every shape
//! is monotonic from peak to floor.
//!
//! # Example
//!
//! ```rust
//! use ebeats_core::Envelope;
//!
//! let mut env = Envelope::new();
//! env.set_peak_level(1.0);
//! env.set_floor_level(0.0);
//! env.set_decay(0.01);
//! env.setup(44100);
//! env.reset();
//!
//! assert_eq!(env.get(64), 1.0);
//! assert!(env.is_running(64));
//! assert!(!env.is_running(441));
//! assert_eq!(env.value_at(441), 0.0);
//! ```

use crate::math::DEFAULT_SAMPLE_RATE;

/// Shortest decay accepted by the parameter table, in seconds.
pub const MIN_DECAY: f64 = 0.001;

/// Longest decay accepted by the parameter table, in seconds.
pub const MAX_DECAY: f64 = 4.0;

/// Decay used by freshly built envelopes, in seconds.
pub const DEFAULT_DECAY: f64 = 0.5;

/// Curve value that yields a straight line.
pub const LINEAR_CURVE: f64 = 0.5;

/// Peak-to-floor decay envelope, re-armed on every trigger.
#[derive(Debug, Clone)]
pub struct Envelope {
    peak_level: f64,
    floor_level: f64,
    /// Decay time in seconds, as last written.
    decay: f64,
    curve: f64,
    /// Exponent derived from `curve`.
    exponent: f64,
    sample_rate: u32,
    /// Decay time in samples at the current sample rate.
    length: u64,
    /// Offset the curve starts from.
    trigger_offset: u64,
    /// Samples consumed through [`Envelope::get`].
    elapsed: u64,
    /// Set by [`Envelope::reset`]; a never-armed envelope is not running.
    armed: bool,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    /// Create an envelope falling from 1.0 to 0.0 over [`DEFAULT_DECAY`]
    /// seconds on a straight line.
    pub fn new() -> Self {
        let mut env = Self {
            peak_level: 1.0,
            floor_level: 0.0,
            decay: DEFAULT_DECAY,
            curve: LINEAR_CURVE,
            exponent: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            length: 0,
            trigger_offset: 0,
            elapsed: 0,
            armed: false,
        };
        env.update_length();
        env
    }

    /// Builder form of [`set_peak_level`](Self::set_peak_level) and
    /// [`set_floor_level`](Self::set_floor_level).
    pub fn with_levels(mut self, peak: f64, floor: f64) -> Self {
        self.set_peak_level(peak);
        self.set_floor_level(floor);
        self
    }

    /// Builder form of [`set_decay`](Self::set_decay).
    pub fn with_decay(mut self, seconds: f64) -> Self {
        self.set_decay(seconds);
        self
    }

    /// Recompute the sample-rate dependent decay length.
    ///
    /// Idempotent for the same inputs. A rate of zero leaves the envelope
    /// with a zero-length decay, so it reads as floor immediately.
    pub fn setup(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.update_length();
    }

    /// Arm the envelope at offset 0.
    pub fn reset(&mut self) {
        self.reset_at(0);
    }

    /// Arm the envelope so that its curve starts at `offset`.
    pub fn reset_at(&mut self, offset: u64) {
        self.trigger_offset = offset;
        self.elapsed = 0;
        self.armed = true;
    }

    /// Whether the curve is still moving at `offset`.
    ///
    /// True for offsets in `[trigger_offset, trigger_offset + decay_samples)`
    /// after a [`reset`](Self::reset); false before the first reset.
    pub fn is_running(&self, offset: u64) -> bool {
        self.armed
            && offset >= self.trigger_offset
            && offset - self.trigger_offset < self.length
    }

    /// Samples left in the running window at `offset`, or 0 once it has
    /// ended.
    pub fn remaining(&self, offset: u64) -> u64 {
        if self.is_running(offset) {
            self.trigger_offset + self.length - offset
        } else {
            0
        }
    }

    /// Value for the next sub-block of `block_size` samples.
    ///
    /// Returns the curve value at the current elapsed position, then advances
    /// the elapsed counter by `block_size`. Callers step in sub-blocks of at
    /// most [`INNER_LOOP`](crate::INNER_LOOP) samples.
    pub fn get(&mut self, block_size: usize) -> f64 {
        let value = self.value_at(self.trigger_offset + self.elapsed);
        self.elapsed += block_size as u64;
        value
    }

    /// Curve value at an absolute sample offset.
    ///
    /// Offsets before the trigger read as peak, offsets at or past the end
    /// of the decay read as floor. The result always lies between the two
    /// levels.
    pub fn value_at(&self, offset: u64) -> f64 {
        let elapsed = offset.saturating_sub(self.trigger_offset);
        if elapsed >= self.length {
            return self.floor_level;
        }
        let t = elapsed as f64 / self.length as f64;
        let shape = if self.exponent == 1.0 {
            t
        } else {
            libm::pow(t, self.exponent)
        };
        let value = self.peak_level + (self.floor_level - self.peak_level) * shape;
        let (lo, hi) = self.bounds();
        value.clamp(lo, hi)
    }

    /// Samples consumed through [`get`](Self::get) since the last reset.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Decay length in samples at the current sample rate.
    pub fn decay_samples(&self) -> u64 {
        self.length
    }

    /// Offset the current curve started at.
    pub fn trigger_offset(&self) -> u64 {
        self.trigger_offset
    }

    /// Set the level the curve starts from. Non-finite values are ignored.
    pub fn set_peak_level(&mut self, level: f64) {
        if level.is_finite() {
            self.peak_level = level;
        }
    }

    /// Level at trigger time.
    pub fn peak_level(&self) -> f64 {
        self.peak_level
    }

    /// Set the level the curve settles at. Non-finite values are ignored.
    pub fn set_floor_level(&mut self, level: f64) {
        if level.is_finite() {
            self.floor_level = level;
        }
    }

    /// Level after the decay has finished.
    pub fn floor_level(&self) -> f64 {
        self.floor_level
    }

    /// Set the decay time in seconds.
    ///
    /// Zero or negative times are stored as 0 and drop straight to floor.
    /// Non-finite values are ignored. The decay length is recomputed right
    /// away with the last sample rate given to [`setup`](Self::setup).
    pub fn set_decay(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.decay = seconds.max(0.0);
            self.update_length();
        }
    }

    /// Decay time in seconds.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Set the curve shape, clamped to `0.0..=1.0`.
    pub fn set_curve(&mut self, curve: f64) {
        if curve.is_nan() {
            return;
        }
        self.curve = curve.clamp(0.0, 1.0);
        self.exponent = libm::exp2((self.curve - LINEAR_CURVE) * 6.0);
    }

    /// Curve shape in `0.0..=1.0`.
    pub fn curve(&self) -> f64 {
        self.curve
    }

    /// Sample rate given to the last [`setup`](Self::setup).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn bounds(&self) -> (f64, f64) {
        if self.peak_level <= self.floor_level {
            (self.peak_level, self.floor_level)
        } else {
            (self.floor_level, self.peak_level)
        }
    }

    fn update_length(&mut self) {
        self.length = (self.decay * f64::from(self.sample_rate)) as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(decay: f64) -> Envelope {
        let mut env = Envelope::new().with_levels(1.0, 0.0).with_decay(decay);
        env.setup(44100);
        env.reset();
        env
    }

    #[test]
    fn test_decay_length_follows_sample_rate() {
        let mut env = Envelope::new().with_decay(0.5);
        env.setup(44100);
        assert_eq!(env.decay_samples(), 22050);
        env.setup(48000);
        assert_eq!(env.decay_samples(), 24000);
        env.setup(48000);
        assert_eq!(env.decay_samples(), 24000, "setup is idempotent");
    }

    #[test]
    fn test_not_running_before_first_reset() {
        let mut env = Envelope::new();
        env.setup(44100);
        assert!(!env.is_running(0));
    }

    #[test]
    fn test_running_window() {
        let env = armed(0.01);
        let len = env.decay_samples();
        assert_eq!(len, 441);
        assert!(env.is_running(0));
        assert!(env.is_running(len - 1));
        assert!(!env.is_running(len));
        assert!(!env.is_running(len * 10));
    }

    #[test]
    fn test_running_window_relative_to_trigger_offset() {
        let mut env = armed(0.01);
        env.reset_at(1000);
        assert!(!env.is_running(999), "before the trigger");
        assert!(env.is_running(1000));
        assert!(env.is_running(1440));
        assert!(!env.is_running(1441));
    }

    #[test]
    fn test_remaining_counts_down_to_the_window_end() {
        let mut env = Envelope::new().with_decay(0.01);
        env.setup(10_000);
        assert_eq!(env.remaining(0), 0, "not armed");
        env.reset_at(500);
        assert_eq!(env.remaining(499), 0);
        assert_eq!(env.remaining(500), 100);
        assert_eq!(env.remaining(599), 1);
        assert_eq!(env.remaining(600), 0);
    }

    #[test]
    fn test_get_starts_at_peak_and_ends_at_floor() {
        let mut env = Envelope::new().with_levels(200.0, 10.0).with_decay(0.01);
        env.setup(44100);
        env.reset();
        assert_eq!(env.get(64), 200.0);

        let mut last = 200.0;
        for _ in 0..20 {
            let v = env.get(64);
            assert!(v <= last, "monotonic: {v} > {last}");
            last = v;
        }
        assert_eq!(last, 10.0);
        assert_eq!(env.elapsed(), 21 * 64);
    }

    #[test]
    fn test_rising_curve() {
        let mut env = Envelope::new().with_levels(0.2, 0.8).with_decay(0.01);
        env.setup(44100);
        env.reset();
        let mut last = env.get(32);
        assert_eq!(last, 0.2);
        for _ in 0..20 {
            let v = env.get(32);
            assert!(v >= last);
            last = v;
        }
        assert_eq!(last, 0.8);
    }

    #[test]
    fn test_linear_midpoint() {
        let env = armed(0.02);
        let mid = env.decay_samples() / 2;
        let v = env.value_at(mid);
        assert!((v - 0.5).abs() < 1e-3, "got {v}");
    }

    #[test]
    fn test_curve_bends_midpoint() {
        let mut fast = armed(0.02);
        fast.set_curve(0.0);
        let mut slow = armed(0.02);
        slow.set_curve(1.0);
        let mid = fast.decay_samples() / 2;
        assert!(fast.value_at(mid) < 0.2, "steep drop, got {}", fast.value_at(mid));
        assert!(slow.value_at(mid) > 0.9, "late drop, got {}", slow.value_at(mid));
    }

    #[test]
    fn test_zero_decay_is_instant_floor() {
        let mut env = Envelope::new().with_levels(1.0, 0.25).with_decay(0.0);
        env.setup(44100);
        env.reset();
        assert!(!env.is_running(0));
        assert_eq!(env.get(64), 0.25);

        env.set_decay(-3.0);
        assert_eq!(env.decay(), 0.0);
        assert_eq!(env.value_at(0), 0.25);
    }

    #[test]
    fn test_zero_sample_rate_does_not_panic() {
        let mut env = Envelope::new();
        env.setup(0);
        env.reset();
        assert!(!env.is_running(0));
        assert_eq!(env.value_at(0), env.floor_level());
    }

    #[test]
    fn test_non_finite_writes_are_ignored() {
        let mut env = Envelope::new().with_levels(0.7, 0.1).with_decay(0.3);
        env.set_peak_level(f64::NAN);
        env.set_floor_level(f64::INFINITY);
        env.set_decay(f64::NAN);
        env.set_curve(f64::NAN);
        assert_eq!(env.peak_level(), 0.7);
        assert_eq!(env.floor_level(), 0.1);
        assert_eq!(env.decay(), 0.3);
        assert_eq!(env.curve(), LINEAR_CURVE);
    }

    #[test]
    fn test_curve_clamped() {
        let mut env = Envelope::new();
        env.set_curve(3.0);
        assert_eq!(env.curve(), 1.0);
        env.set_curve(-1.0);
        assert_eq!(env.curve(), 0.0);
    }

    #[test]
    fn test_reset_rearms() {
        let mut env = armed(0.001);
        for _ in 0..4 {
            env.get(64);
        }
        assert_eq!(env.get(64), 0.0);
        env.reset();
        assert_eq!(env.elapsed(), 0);
        assert_eq!(env.get(64), 1.0);
    }
}
