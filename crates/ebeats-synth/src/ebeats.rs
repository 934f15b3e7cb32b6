//! Electric drum synthesizer.
//!
//! [`EBeats`] mixes a tonal part and a noise part:
//!
//! ```text
//!  osc_t1 ─┐ (volenv_t, freqenv_t1)
//!          ├─ combine ─┬─[filter if Tonal]─┐
//!  osc_t2 ─┘ (volenv_t, freqenv_t2)        │
//!                                          ├─ volume/3 · (t + n) ─[filter if Tonal+Noise]─► out
//!  osc_n ─────(volenv_n)──[filter if Noise]┘
//! ```
//!
//! The filter cutoff follows its own envelope whose decay tracks the part
//! it is routed to. A write of a non-zero `volume` fires a note; the
//! instrument falls silent on its own once both volume envelopes have run
//! out.
//!
//! # Example
//!
//! ```rust
//! use ebeats_core::Wave;
//! use ebeats_synth::{AudioSynth, EBeats, FilterRouting};
//!
//! let mut drum = EBeats::new();
//! drum.setup(44_100);
//! drum.set_t_decay(0.1);
//! drum.set_n_wave(Wave::PinkNoise);
//! drum.set_filter_routing(FilterRouting::Noise);
//! drum.trigger(100);
//!
//! let mut buf = [0i16; 512];
//! assert!(drum.process(&mut buf));
//! assert!(buf.iter().any(|&s| s != 0));
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use ebeats_core::{
    Combine, CombineType, DEFAULT_SAMPLE_RATE, DEFAULT_SEED, Envelope, FilterSvf, FilterType,
    OscControl, OscSynth, ParamDescriptor, ParameterInfo, TriggerCell, Wave, to_sample,
};

use crate::audio_synth::AudioSynth;
use crate::params::{DrumParam, PARAMS, ParamError, param_index};

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};

/// Scratch length allocated by [`EBeats::new`].
pub const DEFAULT_BUFFER_LEN: usize = 1024;

/// Parts of the signal the filter is applied to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterRouting {
    /// The final mix of both parts.
    #[default]
    TonalAndNoise,
    /// Only the combined tonal part.
    Tonal,
    /// Only the noise part.
    Noise,
}

impl FilterRouting {
    /// Every routing in index order.
    pub const ALL: [FilterRouting; 3] = [
        FilterRouting::TonalAndNoise,
        FilterRouting::Tonal,
        FilterRouting::Noise,
    ];

    /// Stable index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Routing at `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable short name.
    pub fn nick(self) -> &'static str {
        match self {
            FilterRouting::TonalAndNoise => "tonal+noise",
            FilterRouting::Tonal => "tonal",
            FilterRouting::Noise => "noise",
        }
    }

    /// Look a routing up by nick.
    pub fn from_nick(nick: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.nick() == nick)
    }
}

/// Single-voice drum synth: two tones, one noise source, one filter.
#[derive(Debug, Clone)]
pub struct EBeats {
    sample_rate: u32,
    /// Gain of the live note, `trigger / 128`; zero when idle.
    volume: f64,

    osc_t1: OscSynth,
    osc_t2: OscSynth,
    osc_n: OscSynth,

    volenv_t: Envelope,
    volenv_n: Envelope,
    freqenv_t1: Envelope,
    freqenv_t2: Envelope,
    fltenv: Envelope,

    mix: Combine,
    filter: FilterSvf,
    filter_routing: FilterRouting,

    // Scratch for tone 2 and the noise part; the output buffer holds tone 1.
    d2: Vec<i16>,
    d3: Vec<i16>,
}

impl Default for EBeats {
    fn default() -> Self {
        Self::new()
    }
}

impl EBeats {
    /// Create the instrument with its default sound.
    pub fn new() -> Self {
        let mut drum = Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: 0.0,
            osc_t1: OscSynth::with_seed(DEFAULT_SEED),
            osc_t2: OscSynth::with_seed(DEFAULT_SEED ^ 0x0002),
            osc_n: OscSynth::with_seed(DEFAULT_SEED ^ 0x0003),
            volenv_t: Envelope::new().with_levels(0.8, 0.0),
            volenv_n: Envelope::new().with_levels(0.8, 0.0),
            freqenv_t1: Envelope::new().with_levels(200.0, 10.0),
            freqenv_t2: Envelope::new().with_levels(210.0, 30.0),
            fltenv: Envelope::new().with_levels(0.8, 0.2),
            mix: Combine::new(),
            filter: FilterSvf::new(),
            filter_routing: FilterRouting::TonalAndNoise,
            d2: vec![0; DEFAULT_BUFFER_LEN],
            d3: vec![0; DEFAULT_BUFFER_LEN],
        };
        drum.osc_t1.set_wave(Wave::Sine);
        drum.osc_t2.set_wave(Wave::Sine);
        drum.osc_n.set_wave(Wave::WhiteNoise);
        drum.update_filter_decay();
        drum
    }

    /// Fire a note. `value` is clamped to `0..=255`; zero does nothing.
    ///
    /// Sets the note gain to `value / 128`, restarts all three oscillators,
    /// re-arms all five envelopes at the current sample rate and restarts
    /// the filter's cutoff timeline.
    pub fn trigger(&mut self, value: u32) {
        if value == 0 {
            return;
        }
        let value = value.min(255);
        self.volume = f64::from(value) / 128.0;

        #[cfg(feature = "tracing")]
        tracing::debug!(value, volume = self.volume, "trigger");

        self.osc_t1.trigger();
        self.osc_t2.trigger();
        self.osc_n.trigger();
        let rate = self.sample_rate;
        for env in [
            &mut self.freqenv_t1,
            &mut self.freqenv_t2,
            &mut self.volenv_t,
            &mut self.volenv_n,
            &mut self.fltenv,
        ] {
            env.setup(rate);
            env.reset();
        }
        self.filter.trigger();
    }

    /// Apply a trigger fired on another thread, if one is pending.
    ///
    /// Call on the audio thread before [`process`](AudioSynth::process);
    /// settle the cell once the buffer is done.
    pub fn process_pending(&mut self, cell: &TriggerCell) -> bool {
        match cell.take() {
            Some(value) => {
                self.trigger(u32::from(value));
                true
            }
            None => false,
        }
    }

    /// Gain of the live note.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Whether the next buffer would produce sound.
    pub fn is_active(&self) -> bool {
        self.volume != 0.0
            && (self.volenv_t.is_running(self.osc_t1.offset())
                || self.volenv_n.is_running(self.osc_n.offset()))
    }

    /// Sample rate given to the last [`setup`](AudioSynth::setup).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // -- tonal part ---------------------------------------------------------

    /// Wave of tone 1. Non-tonal waves are ignored.
    pub fn set_t1_wave(&mut self, wave: Wave) {
        if wave.is_tonal() {
            self.osc_t1.set_wave(wave);
        }
    }

    /// Wave of tone 1.
    pub fn t1_wave(&self) -> Wave {
        self.osc_t1.wave()
    }

    /// Start frequency of tone 1 in Hz.
    pub fn set_t1_freq_start(&mut self, hz: f64) {
        self.freqenv_t1.set_peak_level(hz);
    }

    /// Start frequency of tone 1 in Hz.
    pub fn t1_freq_start(&self) -> f64 {
        self.freqenv_t1.peak_level()
    }

    /// End frequency of tone 1 in Hz.
    pub fn set_t1_freq_end(&mut self, hz: f64) {
        self.freqenv_t1.set_floor_level(hz);
    }

    /// End frequency of tone 1 in Hz.
    pub fn t1_freq_end(&self) -> f64 {
        self.freqenv_t1.floor_level()
    }

    /// Pitch curve of tone 1.
    pub fn set_t1_freq_curve(&mut self, curve: f64) {
        self.freqenv_t1.set_curve(curve);
    }

    /// Pitch curve of tone 1.
    pub fn t1_freq_curve(&self) -> f64 {
        self.freqenv_t1.curve()
    }

    /// Wave of tone 2. Non-tonal waves are ignored.
    pub fn set_t2_wave(&mut self, wave: Wave) {
        if wave.is_tonal() {
            self.osc_t2.set_wave(wave);
        }
    }

    /// Wave of tone 2.
    pub fn t2_wave(&self) -> Wave {
        self.osc_t2.wave()
    }

    /// Start frequency of tone 2 in Hz.
    pub fn set_t2_freq_start(&mut self, hz: f64) {
        self.freqenv_t2.set_peak_level(hz);
    }

    /// Start frequency of tone 2 in Hz.
    pub fn t2_freq_start(&self) -> f64 {
        self.freqenv_t2.peak_level()
    }

    /// End frequency of tone 2 in Hz.
    pub fn set_t2_freq_end(&mut self, hz: f64) {
        self.freqenv_t2.set_floor_level(hz);
    }

    /// End frequency of tone 2 in Hz.
    pub fn t2_freq_end(&self) -> f64 {
        self.freqenv_t2.floor_level()
    }

    /// Pitch curve of tone 2.
    pub fn set_t2_freq_curve(&mut self, curve: f64) {
        self.freqenv_t2.set_curve(curve);
    }

    /// Pitch curve of tone 2.
    pub fn t2_freq_curve(&self) -> f64 {
        self.freqenv_t2.curve()
    }

    /// Peak volume of the tonal part.
    pub fn set_t_volume(&mut self, level: f64) {
        self.volenv_t.set_peak_level(level);
    }

    /// Peak volume of the tonal part.
    pub fn t_volume(&self) -> f64 {
        self.volenv_t.peak_level()
    }

    /// Decay of the tonal part in seconds; drives both pitch sweeps too.
    pub fn set_t_decay(&mut self, seconds: f64) {
        self.volenv_t.set_decay(seconds);
        self.freqenv_t1.set_decay(seconds);
        self.freqenv_t2.set_decay(seconds);
        self.update_filter_decay();
    }

    /// Decay of the tonal part in seconds.
    pub fn t_decay(&self) -> f64 {
        self.volenv_t.decay()
    }

    /// Volume curve of the tonal part.
    pub fn set_t_vol_curve(&mut self, curve: f64) {
        self.volenv_t.set_curve(curve);
    }

    /// Volume curve of the tonal part.
    pub fn t_vol_curve(&self) -> f64 {
        self.volenv_t.curve()
    }

    /// Operator merging the two tones.
    pub fn set_combine(&mut self, combine: CombineType) {
        self.mix.set_combine(combine);
    }

    /// Operator merging the two tones.
    pub fn combine(&self) -> CombineType {
        self.mix.combine()
    }

    // -- noise part ---------------------------------------------------------

    /// Wave of the noise part. Non-noise waves are ignored.
    pub fn set_n_wave(&mut self, wave: Wave) {
        if wave.is_noise() {
            self.osc_n.set_wave(wave);
        }
    }

    /// Wave of the noise part.
    pub fn n_wave(&self) -> Wave {
        self.osc_n.wave()
    }

    /// Peak volume of the noise part.
    pub fn set_n_volume(&mut self, level: f64) {
        self.volenv_n.set_peak_level(level);
    }

    /// Peak volume of the noise part.
    pub fn n_volume(&self) -> f64 {
        self.volenv_n.peak_level()
    }

    /// Decay of the noise part in seconds.
    pub fn set_n_decay(&mut self, seconds: f64) {
        self.volenv_n.set_decay(seconds);
        self.update_filter_decay();
    }

    /// Decay of the noise part in seconds.
    pub fn n_decay(&self) -> f64 {
        self.volenv_n.decay()
    }

    /// Volume curve of the noise part.
    pub fn set_n_vol_curve(&mut self, curve: f64) {
        self.volenv_n.set_curve(curve);
    }

    /// Volume curve of the noise part.
    pub fn n_vol_curve(&self) -> f64 {
        self.volenv_n.curve()
    }

    // -- filter -------------------------------------------------------------

    /// Which parts the filter is applied to.
    pub fn set_filter_routing(&mut self, routing: FilterRouting) {
        self.filter_routing = routing;
        self.update_filter_decay();
    }

    /// Which parts the filter is applied to.
    pub fn filter_routing(&self) -> FilterRouting {
        self.filter_routing
    }

    /// Filter response.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter.set_filter_type(filter_type);
    }

    /// Filter response.
    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    /// Cutoff at trigger time, `0.0..=1.0`.
    pub fn set_cutoff_start(&mut self, cutoff: f64) {
        self.fltenv.set_peak_level(cutoff.clamp(0.0, 1.0));
    }

    /// Cutoff at trigger time.
    pub fn cutoff_start(&self) -> f64 {
        self.fltenv.peak_level()
    }

    /// Cutoff after the decay, `0.0..=1.0`.
    pub fn set_cutoff_end(&mut self, cutoff: f64) {
        self.fltenv.set_floor_level(cutoff.clamp(0.0, 1.0));
    }

    /// Cutoff after the decay.
    pub fn cutoff_end(&self) -> f64 {
        self.fltenv.floor_level()
    }

    /// Cutoff curve.
    pub fn set_cutoff_curve(&mut self, curve: f64) {
        self.fltenv.set_curve(curve);
    }

    /// Cutoff curve.
    pub fn cutoff_curve(&self) -> f64 {
        self.fltenv.curve()
    }

    /// Filter resonance.
    pub fn set_resonance(&mut self, resonance: f64) {
        self.filter.set_resonance(resonance);
    }

    /// Filter resonance.
    pub fn resonance(&self) -> f64 {
        self.filter.resonance()
    }

    /// Decay of the cutoff envelope, derived from the routing.
    pub fn filter_decay(&self) -> f64 {
        self.fltenv.decay()
    }

    /// Keep the cutoff sweep as long as the part it filters.
    fn update_filter_decay(&mut self) {
        let decay = match self.filter_routing {
            FilterRouting::TonalAndNoise => self.volenv_t.decay().max(self.volenv_n.decay()),
            FilterRouting::Tonal => self.volenv_t.decay(),
            FilterRouting::Noise => self.volenv_n.decay(),
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(decay, routing = self.filter_routing.nick(), "filter decay");

        self.fltenv.set_decay(decay);
    }

    // -- parameter writes ---------------------------------------------------

    /// Apply one typed parameter write.
    pub fn apply(&mut self, param: DrumParam) {
        match param {
            DrumParam::Volume(v) => self.trigger(v),
            DrumParam::T1Wave(w) => self.set_t1_wave(w),
            DrumParam::T1FreqStart(v) => self.set_t1_freq_start(v),
            DrumParam::T1FreqEnd(v) => self.set_t1_freq_end(v),
            DrumParam::T1FreqCurve(v) => self.set_t1_freq_curve(v),
            DrumParam::T2Wave(w) => self.set_t2_wave(w),
            DrumParam::T2FreqStart(v) => self.set_t2_freq_start(v),
            DrumParam::T2FreqEnd(v) => self.set_t2_freq_end(v),
            DrumParam::T2FreqCurve(v) => self.set_t2_freq_curve(v),
            DrumParam::TVolume(v) => self.set_t_volume(v),
            DrumParam::TDecay(v) => self.set_t_decay(v),
            DrumParam::TVolCurve(v) => self.set_t_vol_curve(v),
            DrumParam::TCombine(c) => self.set_combine(c),
            DrumParam::NWave(w) => self.set_n_wave(w),
            DrumParam::NVolume(v) => self.set_n_volume(v),
            DrumParam::NDecay(v) => self.set_n_decay(v),
            DrumParam::NVolCurve(v) => self.set_n_vol_curve(v),
            DrumParam::FilterRouting(r) => self.set_filter_routing(r),
            DrumParam::Filter(t) => self.set_filter_type(t),
            DrumParam::CutoffStart(v) => self.set_cutoff_start(v),
            DrumParam::CutoffEnd(v) => self.set_cutoff_end(v),
            DrumParam::CutoffCurve(v) => self.set_cutoff_curve(v),
            DrumParam::Resonance(v) => self.set_resonance(v),
        }
    }

    /// Write a numeric value by parameter name. Enumerated parameters take
    /// a choice index; out-of-range values are clamped.
    pub fn set_param_by_name(&mut self, name: &str, value: f64) -> Result<(), ParamError> {
        let index =
            param_index(name).ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        let write = DrumParam::from_value(index, value).ok_or_else(|| ParamError::InvalidValue {
            param: name.to_string(),
            value,
        })?;
        self.apply(write);
        Ok(())
    }

    /// Write an enumerated parameter by choice nick, e.g.
    /// `("n-wave", "pink-noise")`.
    pub fn set_param_nick(&mut self, name: &str, nick: &str) -> Result<(), ParamError> {
        let index =
            param_index(name).ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        let choice = PARAMS[index]
            .choice_index(nick)
            .ok_or_else(|| ParamError::UnknownChoice {
                param: name.to_string(),
                nick: nick.to_string(),
            })?;
        self.set_param_by_name(name, choice as f64)
    }

    /// Read a parameter by name. Enumerated parameters read as their choice
    /// index.
    pub fn get_param_by_name(&self, name: &str) -> Result<f64, ParamError> {
        let index =
            param_index(name).ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        if !PARAMS[index].is_readable() {
            return Err(ParamError::WriteOnly(name.to_string()));
        }
        Ok(self.get_param(index))
    }

    fn choice_of(list: &[Wave], wave: Wave) -> f64 {
        list.iter().position(|w| *w == wave).unwrap_or(0) as f64
    }

    // -- rendering ----------------------------------------------------------

    /// Render one piece no longer than the scratch buffers.
    /// Samples until the next running volume envelope ends.
    fn until_envelope_end(&self) -> usize {
        let t = self.volenv_t.remaining(self.osc_t1.offset());
        let n = self.volenv_n.remaining(self.osc_n.offset());
        let left = match (t, n) {
            (0, 0) => return usize::MAX,
            (0, x) | (x, 0) => x,
            (a, b) => a.min(b),
        };
        usize::try_from(left).unwrap_or(usize::MAX)
    }

    fn process_chunk(&mut self, d1: &mut [i16]) -> bool {
        let env_t = self.volenv_t.is_running(self.osc_t1.offset());
        let env_n = self.volenv_n.is_running(self.osc_n.offset());
        if self.volume == 0.0 || !(env_t || env_n) {
            return false;
        }

        let n = d1.len();
        let d2 = &mut self.d2[..n];
        let d3 = &mut self.d3[..n];

        if env_t {
            self.osc_t1.process(
                d1,
                OscControl::new()
                    .volume(&self.volenv_t)
                    .frequency(&self.freqenv_t1),
            );
            self.osc_t2.process(
                d2,
                OscControl::new()
                    .volume(&self.volenv_t)
                    .frequency(&self.freqenv_t2),
            );
            self.mix.process(d1, d2);
            if self.filter_routing == FilterRouting::Tonal {
                self.filter.process(d1, Some(&self.fltenv));
            }
        } else {
            d1.fill(0);
        }

        if env_n {
            self.osc_n.process(d3, OscControl::new().volume(&self.volenv_n));
            if self.filter_routing == FilterRouting::Noise {
                self.filter.process(d3, Some(&self.fltenv));
            }
        } else {
            d3.fill(0);
        }

        let v = self.volume / 3.0;
        for (t, &noise) in d1.iter_mut().zip(d3.iter()) {
            *t = to_sample(v * (f64::from(*t) + f64::from(noise)));
        }
        if self.filter_routing == FilterRouting::TonalAndNoise {
            self.filter.process(d1, Some(&self.fltenv));
        }
        true
    }
}

impl AudioSynth for EBeats {
    fn setup(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.osc_t1.set_sample_rate(self.sample_rate);
        self.osc_t2.set_sample_rate(self.sample_rate);
        self.osc_n.set_sample_rate(self.sample_rate);
    }

    fn reset(&mut self) {
        self.volume = 0.0;
        self.volenv_t.reset();
        self.volenv_n.reset();
    }

    /// Buffers longer than the scratch space render in pieces; once a piece
    /// has sounded, later silent pieces are zero-filled so the buffer is
    /// always complete. Pieces also end where a volume envelope runs out.
    fn process(&mut self, out: &mut [i16]) -> bool {
        let step = self.d2.len().max(1);
        let mut produced = false;
        let mut start = 0;
        while start < out.len() {
            let len = (out.len() - start).min(step).min(self.until_envelope_end());
            let chunk = &mut out[start..start + len];
            if self.process_chunk(chunk) {
                produced = true;
            } else if produced {
                chunk.fill(0);
            } else {
                return false;
            }
            start += len;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(len = out.len(), produced, "ebeats buffer");

        produced
    }

    fn set_max_buffer_len(&mut self, len: usize) {
        let len = len.max(1);
        if self.d2.len() != len {
            self.d2 = vec![0; len];
            self.d3 = vec![0; len];
        }
    }

    fn max_buffer_len(&self) -> usize {
        self.d2.len()
    }
}

impl ParameterInfo for EBeats {
    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f64 {
        match index {
            0 => 0.0,
            1 => Self::choice_of(&Wave::TONAL, self.t1_wave()),
            2 => self.t1_freq_start(),
            3 => self.t1_freq_end(),
            4 => self.t1_freq_curve(),
            5 => Self::choice_of(&Wave::TONAL, self.t2_wave()),
            6 => self.t2_freq_start(),
            7 => self.t2_freq_end(),
            8 => self.t2_freq_curve(),
            9 => self.t_volume(),
            10 => self.t_decay(),
            11 => self.t_vol_curve(),
            12 => self.combine().index() as f64,
            13 => Self::choice_of(&Wave::NOISE, self.n_wave()),
            14 => self.n_volume(),
            15 => self.n_decay(),
            16 => self.n_vol_curve(),
            17 => self.filter_routing().index() as f64,
            18 => self.filter_type().index() as f64,
            19 => self.cutoff_start(),
            20 => self.cutoff_end(),
            21 => self.cutoff_curve(),
            22 => self.resonance(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f64) {
        if let Some(write) = DrumParam::from_value(index, value) {
            self.apply(write);
        }
    }
}
