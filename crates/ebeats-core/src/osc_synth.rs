//! Waveform oscillator producing 16-bit sample buffers.
//!
//! [`OscSynth`] renders one [`Wave`] family into an `i16` buffer per call.
//! Tonal waves run a phase accumulator in radians that carries over between
//! calls, so splitting a render into several calls yields the same samples
//! as one long call. Noise waves keep their generator state between calls
//! in the same way.
//!
//! # Control binding
//!
//! Volume and frequency are either constants owned by the oscillator or read
//! from a bound [`Envelope`]. Bindings are passed per call through
//! [`OscControl`] as shared borrows: the oscillator evaluates the envelope at
//! its own sample offset and can never re-arm or advance it. Bound values
//! are re-read at the start of every [`INNER_LOOP`](crate::INNER_LOOP)
//! sub-block on the absolute sample grid.
//!
//! # Amplitude
//!
//! | wave | sample |
//! |------|--------|
//! | sine | `sin(acc) * vol * 32767` |
//! | square | `±vol * 32767` |
//! | saw | ramp through `±vol * 32767` |
//! | triangle | three segments peaking at `±vol * 32767` |
//! | white / s&h / spikes / s&g | `vol * (32768 - 65535 u)` |
//! | pink / gaussian / red | generator output `* vol * 32767` |
//!
//! Every conversion to `i16` saturates.
//!
//! # Example
//!
//! ```rust
//! use ebeats_core::{Envelope, OscControl, OscSynth, Wave};
//!
//! let mut volume = Envelope::new().with_levels(0.8, 0.0).with_decay(0.1);
//! volume.setup(44100);
//! volume.reset();
//!
//! let mut osc = OscSynth::new();
//! osc.set_sample_rate(44100);
//! osc.set_wave(Wave::Square);
//! osc.set_frequency(220.0);
//! osc.trigger();
//!
//! let mut buf = [0i16; 256];
//! osc.process(&mut buf, OscControl::new().volume(&volume));
//! assert!(buf.iter().any(|&s| s != 0));
//! ```

use core::f64::consts::{PI, TAU};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::envelope::Envelope;
use crate::math::{DEFAULT_SAMPLE_RATE, sub_blocks, to_sample};

/// Seed used by [`OscSynth::new`].
pub const DEFAULT_SEED: u64 = 0x5eed_0b5c;

/// Number of accumulator rows of the pink noise generator.
const PINK_ROWS: usize = 12;

/// Bound of the red noise random walk, in walk units.
const RED_LIMIT: f64 = 8.0;

/// Oscillator waveform.
///
/// The index order is stable and used at the host boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Wave {
    /// Sine.
    #[default]
    Sine,
    /// Square with 50% duty cycle.
    Square,
    /// Sawtooth.
    Saw,
    /// Triangle.
    Triangle,
    /// Zero-filled output.
    Silence,
    /// Uniform white noise.
    WhiteNoise,
    /// 1/f noise, Voss-McCartney with 12 rows.
    PinkNoise,
    /// Normally distributed white noise (Box-Muller).
    GaussianNoise,
    /// 1/f² noise from a bounded random walk.
    RedNoise,
    /// Pink noise with every other sample negated.
    BlueNoise,
    /// Red noise with every other sample negated.
    VioletNoise,
    /// Random value held for `sample_rate / frequency` samples.
    SampleAndHold,
    /// Random value emitted once every `sample_rate / frequency` samples.
    Spikes,
    /// Linear glide to a new random value every `sample_rate / frequency`
    /// samples.
    SampleAndGlide,
}

impl Wave {
    /// Every wave in index order.
    pub const ALL: [Wave; 14] = [
        Wave::Sine,
        Wave::Square,
        Wave::Saw,
        Wave::Triangle,
        Wave::Silence,
        Wave::WhiteNoise,
        Wave::PinkNoise,
        Wave::GaussianNoise,
        Wave::RedNoise,
        Wave::BlueNoise,
        Wave::VioletNoise,
        Wave::SampleAndHold,
        Wave::Spikes,
        Wave::SampleAndGlide,
    ];

    /// Waves accepted by a pitched oscillator slot.
    pub const TONAL: [Wave; 8] = [
        Wave::Silence,
        Wave::Sine,
        Wave::Square,
        Wave::Saw,
        Wave::Triangle,
        Wave::SampleAndHold,
        Wave::Spikes,
        Wave::SampleAndGlide,
    ];

    /// Waves accepted by a noise oscillator slot.
    pub const NOISE: [Wave; 7] = [
        Wave::Silence,
        Wave::WhiteNoise,
        Wave::PinkNoise,
        Wave::GaussianNoise,
        Wave::RedNoise,
        Wave::BlueNoise,
        Wave::VioletNoise,
    ];

    /// Stable index of this wave.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wave at `index`, or `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable short name, e.g. `"white-noise"`.
    pub fn nick(self) -> &'static str {
        match self {
            Wave::Sine => "sine",
            Wave::Square => "square",
            Wave::Saw => "saw",
            Wave::Triangle => "triangle",
            Wave::Silence => "silence",
            Wave::WhiteNoise => "white-noise",
            Wave::PinkNoise => "pink-noise",
            Wave::GaussianNoise => "gaussian-noise",
            Wave::RedNoise => "red-noise",
            Wave::BlueNoise => "blue-noise",
            Wave::VioletNoise => "violet-noise",
            Wave::SampleAndHold => "sample-and-hold",
            Wave::Spikes => "spikes",
            Wave::SampleAndGlide => "sample-and-glide",
        }
    }

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            Wave::Sine => "Sine",
            Wave::Square => "Square",
            Wave::Saw => "Saw",
            Wave::Triangle => "Triangle",
            Wave::Silence => "Silence",
            Wave::WhiteNoise => "White noise",
            Wave::PinkNoise => "Pink noise",
            Wave::GaussianNoise => "White Gaussian noise",
            Wave::RedNoise => "Red (brownian) noise",
            Wave::BlueNoise => "Blue noise",
            Wave::VioletNoise => "Violet noise",
            Wave::SampleAndHold => "Sample and Hold",
            Wave::Spikes => "Spikes",
            Wave::SampleAndGlide => "Sample and Glide",
        }
    }

    /// Look a wave up by its [`nick`](Self::nick).
    pub fn from_nick(nick: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|w| w.nick() == nick)
    }

    /// Whether a pitched oscillator slot accepts this wave.
    pub fn is_tonal(self) -> bool {
        Self::TONAL.contains(&self)
    }

    /// Whether a noise oscillator slot accepts this wave.
    pub fn is_noise(self) -> bool {
        Self::NOISE.contains(&self)
    }
}

/// Envelope bindings for one [`OscSynth::process`] call.
///
/// Unbound parameters fall back to the oscillator's own constants.
#[derive(Clone, Copy, Debug, Default)]
pub struct OscControl<'a> {
    volume: Option<&'a Envelope>,
    frequency: Option<&'a Envelope>,
}

impl<'a> OscControl<'a> {
    /// No bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind volume (linear gain) to `env`.
    pub fn volume(mut self, env: &'a Envelope) -> Self {
        self.volume = Some(env);
        self
    }

    /// Bind frequency (Hz) to `env`.
    pub fn frequency(mut self, env: &'a Envelope) -> Self {
        self.frequency = Some(env);
        self
    }
}

/// Voss-McCartney pink noise state.
#[derive(Debug, Clone)]
struct PinkNoise {
    rows: [i64; PINK_ROWS],
    running_sum: i64,
    index: u32,
    index_mask: u32,
    scalar: f64,
}

impl PinkNoise {
    fn new() -> Self {
        Self {
            rows: [0; PINK_ROWS],
            running_sum: 0,
            index: 0,
            index_mask: (1 << PINK_ROWS) - 1,
            // One extra row for the white value added on every sample.
            scalar: 1.0 / ((PINK_ROWS + 1) as f64 * f64::from(1u32 << 15)),
        }
    }

    /// Next value in `[-1, 1)`.
    fn next(&mut self, rng: &mut SmallRng) -> f64 {
        self.index = (self.index + 1) & self.index_mask;
        if self.index != 0 {
            let row = self.index.trailing_zeros() as usize;
            let value = random_row(rng);
            self.running_sum += value - self.rows[row];
            self.rows[row] = value;
        }
        let sum = self.running_sum + random_row(rng);
        self.scalar * sum as f64
    }
}

/// Shared state of the sample-and-hold family.
#[derive(Debug, Clone, Copy, Default)]
struct Hold {
    /// Samples left until the next draw.
    count: i64,
    /// Current value.
    smpl: f64,
    /// Per-sample glide increment.
    next: f64,
    /// Volume held since the last grid point or draw.
    amp: f64,
}

/// Waveform oscillator with per-note offset and phase continuity.
#[derive(Debug, Clone)]
pub struct OscSynth {
    wave: Wave,
    /// Volume used when no envelope is bound, `0.0..=1.0`.
    volume: f64,
    /// Frequency in Hz used when no envelope is bound.
    frequency: f64,
    sample_rate: u32,
    /// Phase increment per Hz, `2π / sample_rate`.
    period: f64,
    /// Samples rendered since the last trigger.
    offset: u64,
    /// Phase in `[0, 2π)`.
    accumulator: f64,
    /// Sign for blue and violet noise.
    flip: bool,
    pink: PinkNoise,
    /// Red noise walk position in `[-8, 8]`.
    red: f64,
    /// Second value of the last Box-Muller pair.
    gauss_spare: Option<f64>,
    hold: Hold,
    rng: SmallRng,
}

impl Default for OscSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl OscSynth {
    /// Create a sine oscillator at 440 Hz, full volume, default sample rate.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create an oscillator whose noise generators start from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            wave: Wave::Sine,
            volume: 1.0,
            frequency: 440.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            period: TAU / f64::from(DEFAULT_SAMPLE_RATE),
            offset: 0,
            accumulator: 0.0,
            flip: false,
            pink: PinkNoise::new(),
            red: 0.0,
            gauss_spare: None,
            hold: Hold::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Select the waveform.
    ///
    /// Re-initialises the generator state that belongs to the new wave
    /// (pink rows, red walk, held value) and then acts like
    /// [`trigger`](Self::trigger).
    pub fn set_wave(&mut self, wave: Wave) {
        #[cfg(feature = "tracing")]
        tracing::debug!(from = self.wave.nick(), to = wave.nick(), "osc wave change");

        self.wave = wave;
        match wave {
            Wave::PinkNoise | Wave::BlueNoise => self.pink = PinkNoise::new(),
            Wave::RedNoise | Wave::VioletNoise => self.red = 0.0,
            Wave::GaussianNoise => self.gauss_spare = None,
            _ => {}
        }
        self.trigger();
    }

    /// Current waveform.
    pub fn wave(&self) -> Wave {
        self.wave
    }

    /// Set the unbound volume, clamped to `0.0..=1.0`.
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_nan() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    /// Unbound volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Set the unbound frequency in Hz. Negative values clamp to 0.
    pub fn set_frequency(&mut self, freq: f64) {
        if freq.is_finite() {
            self.frequency = freq.max(0.0);
        }
    }

    /// Unbound frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Set the sample rate. Zero is treated as 1 Hz.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.period = TAU / f64::from(self.sample_rate);
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples rendered since the last trigger.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Current phase in radians, always in `[0, 2π)`.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Restart the note.
    ///
    /// Resets the sample offset, the phase and the blue/violet sign. The
    /// sample-and-hold family restarts from zero with a fresh draw due on
    /// the first sample; sample-and-glide also draws a new slope. Noise
    /// generator memory is kept; it is only re-initialised by
    /// [`set_wave`](Self::set_wave). Call once per note onset, before the
    /// first [`process`](Self::process) of that note.
    pub fn trigger(&mut self) {
        self.offset = 0;
        self.accumulator = 0.0;
        self.flip = false;
        match self.wave {
            Wave::SampleAndHold | Wave::Spikes => self.hold = Hold::default(),
            Wave::SampleAndGlide => {
                self.hold = Hold {
                    next: random_value(&mut self.rng),
                    ..Hold::default()
                };
            }
            _ => self.hold.count = 0,
        }
    }

    /// Fill `out` with the next `out.len()` samples of the current wave and
    /// advance the offset by the same amount.
    pub fn process(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        match self.wave {
            Wave::Sine => self.tonal(out, ctl, 32767.0, |acc, amp| libm::sin(acc) * amp),
            Wave::Square => self.tonal(out, ctl, 32767.0, |acc, amp| {
                if acc < PI { amp } else { -amp }
            }),
            Wave::Saw => self.tonal(out, ctl, 32767.0 / PI, |acc, amp| {
                if acc < PI {
                    acc * amp
                } else {
                    (TAU - acc) * -amp
                }
            }),
            Wave::Triangle => self.tonal(out, ctl, 65535.0 / PI, |acc, amp| {
                if acc < PI * 0.5 {
                    acc * amp
                } else if acc < PI * 1.5 {
                    (acc - PI) * -amp
                } else {
                    (TAU - acc) * -amp
                }
            }),
            Wave::Silence => out.fill(0),
            Wave::WhiteNoise => self.white(out, ctl),
            Wave::PinkNoise => self.pink(out, ctl),
            Wave::GaussianNoise => self.gaussian(out, ctl),
            Wave::RedNoise => self.red(out, ctl),
            Wave::BlueNoise => {
                self.pink(out, ctl);
                self.alternate_sign(out);
            }
            Wave::VioletNoise => {
                self.red(out, ctl);
                self.alternate_sign(out);
            }
            Wave::SampleAndHold => self.sample_and_hold(out, ctl),
            Wave::Spikes => self.spikes(out, ctl),
            Wave::SampleAndGlide => self.sample_and_glide(out, ctl),
        }
        self.offset += out.len() as u64;
    }

    fn control_volume(&self, ctl: OscControl<'_>, at: u64) -> f64 {
        ctl.volume.map_or(self.volume, |env| env.value_at(at))
    }

    fn control_frequency(&self, ctl: OscControl<'_>, at: u64) -> f64 {
        ctl.frequency
            .map_or(self.frequency, |env| env.value_at(at))
            .max(0.0)
    }

    fn tonal(
        &mut self,
        out: &mut [i16],
        ctl: OscControl<'_>,
        ampf: f64,
        shape: impl Fn(f64, f64) -> f64,
    ) {
        let mut acc = self.accumulator;
        for (at, block) in sub_blocks(self.offset, out.len()) {
            let amp = self.control_volume(ctl, at) * ampf;
            let step = self.control_frequency(ctl, at) * self.period;
            for s in &mut out[block] {
                acc += step;
                if acc >= TAU {
                    acc -= TAU;
                    if acc >= TAU {
                        acc %= TAU;
                    }
                }
                *s = to_sample(shape(acc, amp));
            }
        }
        self.accumulator = acc;
    }

    fn white(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        for (at, block) in sub_blocks(self.offset, out.len()) {
            let amp = self.control_volume(ctl, at);
            for s in &mut out[block] {
                *s = to_sample(amp * random_value(&mut self.rng));
            }
        }
    }

    fn pink(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        for (at, block) in sub_blocks(self.offset, out.len()) {
            let amp = self.control_volume(ctl, at) * 32767.0;
            for s in &mut out[block] {
                *s = to_sample(self.pink.next(&mut self.rng) * amp);
            }
        }
    }

    fn gaussian(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        for (at, block) in sub_blocks(self.offset, out.len()) {
            let amp = self.control_volume(ctl, at) * 32767.0;
            for s in &mut out[block] {
                let v = match self.gauss_spare.take() {
                    Some(spare) => spare,
                    None => {
                        let mag = libm::sqrt(-2.0 * libm::log(1.0 - unit(&mut self.rng)));
                        let phs = TAU * unit(&mut self.rng);
                        self.gauss_spare = Some(mag * libm::sin(phs));
                        mag * libm::cos(phs)
                    }
                };
                *s = to_sample(amp * v);
            }
        }
    }

    fn red(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        let mut state = self.red;
        for (at, block) in sub_blocks(self.offset, out.len()) {
            let amp = self.control_volume(ctl, at) * 32767.0;
            for s in &mut out[block] {
                loop {
                    let r = 1.0 - 2.0 * unit(&mut self.rng);
                    let stepped = state + r;
                    if (-RED_LIMIT..=RED_LIMIT).contains(&stepped) {
                        state = stepped;
                        break;
                    }
                }
                *s = to_sample(amp * state * 0.0625);
            }
        }
        self.red = state;
    }

    fn alternate_sign(&mut self, out: &mut [i16]) {
        let mut flip = self.flip;
        for s in out.iter_mut() {
            if flip {
                *s = s.saturating_neg();
            }
            flip = !flip;
        }
        self.flip = flip;
    }

    /// Samples until the next draw at the frequency bound at `at`.
    fn hold_count(&self, ctl: OscControl<'_>, at: u64) -> i64 {
        let rate = f64::from(self.sample_rate);
        let step = self.control_frequency(ctl, at).clamp(1.0, rate);
        (rate / step) as i64
    }

    fn sample_and_hold(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        let mut hold = self.hold;
        for (at, block) in sub_blocks(self.offset, out.len()) {
            if self.offset + block.start as u64 == at {
                hold.amp = self.control_volume(ctl, at);
            }
            for i in block {
                if hold.count <= 0 {
                    let at = self.offset + i as u64;
                    hold.count = self.hold_count(ctl, at);
                    hold.smpl = random_value(&mut self.rng);
                    hold.amp = self.control_volume(ctl, at);
                }
                out[i] = to_sample(hold.amp * hold.smpl);
                hold.count -= 1;
            }
        }
        self.hold = hold;
    }

    fn spikes(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        let mut hold = self.hold;
        for i in 0..out.len() {
            if hold.count <= 0 {
                let at = self.offset + i as u64;
                hold.count = self.hold_count(ctl, at);
                hold.smpl = random_value(&mut self.rng);
                out[i] = to_sample(self.control_volume(ctl, at) * hold.smpl);
            } else {
                out[i] = 0;
            }
            hold.count -= 1;
        }
        self.hold = hold;
    }

    fn sample_and_glide(&mut self, out: &mut [i16], ctl: OscControl<'_>) {
        let mut hold = self.hold;
        for (at, block) in sub_blocks(self.offset, out.len()) {
            if self.offset + block.start as u64 == at {
                hold.amp = self.control_volume(ctl, at);
            }
            for i in block {
                if hold.count <= 0 {
                    let at = self.offset + i as u64;
                    hold.count = self.hold_count(ctl, at);
                    let target = random_value(&mut self.rng);
                    hold.next = (target - hold.smpl) / hold.count as f64;
                    hold.amp = self.control_volume(ctl, at);
                }
                out[i] = to_sample(hold.amp * hold.smpl);
                hold.count -= 1;
                hold.smpl += hold.next;
            }
        }
        self.hold = hold;
    }
}

/// Uniform draw in `[0, 1)` with 53 bits of precision.
#[inline]
fn unit(rng: &mut SmallRng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Uniform sample value in `(-32767, 32768]`.
#[inline]
fn random_value(rng: &mut SmallRng) -> f64 {
    32768.0 - 65535.0 * unit(rng)
}

/// Uniform pink row value in `(-32768, 32768]`.
#[inline]
fn random_row(rng: &mut SmallRng) -> i64 {
    (32768.0 - 65536.0 * unit(rng)) as i64
}
