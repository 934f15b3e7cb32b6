//! Parameter table of the [`EBeats`](crate::EBeats) drum synth.
//!
//! [`PARAMS`] describes every parameter in a stable order; [`DrumParam`] is
//! the typed form of one write. Names, ranges and defaults are shared by
//! patch files, the command line and [`ParameterInfo`](ebeats_core::ParameterInfo).

use ebeats_core::{
    CombineType, FilterType, MAX_DECAY, MAX_RESONANCE, MIN_DECAY, MIN_RESONANCE, ParamDescriptor,
    ParamId, ParamUnit, Wave,
};
use thiserror::Error;

use crate::ebeats::FilterRouting;

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Errors from writing or reading a parameter by name.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    /// No parameter has this name.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// The value is not a finite number.
    #[error("invalid value {value} for parameter '{param}'")]
    InvalidValue {
        /// Parameter name.
        param: String,
        /// Rejected value.
        value: f64,
    },

    /// The nick names no choice of an enumerated parameter.
    #[error("'{nick}' is not a choice of parameter '{param}'")]
    UnknownChoice {
        /// Parameter name.
        param: String,
        /// Rejected nick.
        nick: String,
    },

    /// The parameter cannot be read back.
    #[error("parameter '{0}' is write-only")]
    WriteOnly(String),
}

/// Choice nicks of the tonal oscillator slots, in [`Wave::TONAL`] order.
pub const TONAL_WAVES: &[&str] = &[
    "silence",
    "sine",
    "square",
    "saw",
    "triangle",
    "sample-and-hold",
    "spikes",
    "sample-and-glide",
];

/// Choice nicks of the noise oscillator slot, in [`Wave::NOISE`] order.
pub const NOISE_WAVES: &[&str] = &[
    "silence",
    "white-noise",
    "pink-noise",
    "gaussian-noise",
    "red-noise",
    "blue-noise",
    "violet-noise",
];

/// Choice nicks of [`CombineType`], in index order.
pub const COMBINE_TYPES: &[&str] = &["mix", "mul", "sub", "max", "min", "and", "or", "xor", "fold"];

/// Choice nicks of [`FilterRouting`], in index order.
pub const FILTER_ROUTINGS: &[&str] = &["tonal+noise", "tonal", "noise"];

/// Choice nicks of [`FilterType`], in index order.
pub const FILTER_TYPES: &[&str] = &["none", "lowpass", "hipass", "bandpass", "bandstop"];

const fn curve(name: &'static str, label: &'static str, id: u32) -> ParamDescriptor {
    ParamDescriptor::continuous(name, label, ParamUnit::Ratio, 0.0, 1.0, 0.5).with_id(ParamId(id))
}

const fn decay(name: &'static str, label: &'static str, id: u32) -> ParamDescriptor {
    ParamDescriptor::continuous(name, label, ParamUnit::Seconds, MIN_DECAY, MAX_DECAY, 0.5)
        .with_id(ParamId(id))
}

const fn freq(
    name: &'static str,
    label: &'static str,
    max: f64,
    default: f64,
    id: u32,
) -> ParamDescriptor {
    ParamDescriptor::continuous(name, label, ParamUnit::Hertz, 1.0, max, default)
        .with_id(ParamId(id))
}

const fn level(name: &'static str, label: &'static str, default: f64, id: u32) -> ParamDescriptor {
    ParamDescriptor::continuous(name, label, ParamUnit::Ratio, 0.0, 1.0, default)
        .with_id(ParamId(id))
}

/// Every parameter, in index order. Ids are stable across releases.
pub static PARAMS: [ParamDescriptor; 23] = [
    ParamDescriptor::trigger("volume", "Tone volume", 255).with_id(ParamId(1)),
    ParamDescriptor::choice("t1-wave", "Tonal waveform 1", TONAL_WAVES, 1).with_id(ParamId(2)),
    freq("t1-freq-start", "T1 Start Freq.", 10_000.0, 200.0, 3),
    freq("t1-freq-end", "T1 End Freq.", 1000.0, 10.0, 4),
    curve("t1-freq-curve", "T1 Freq. Curve", 5),
    ParamDescriptor::choice("t2-wave", "Tonal waveform 2", TONAL_WAVES, 1).with_id(ParamId(6)),
    freq("t2-freq-start", "T2 Start Freq.", 10_000.0, 210.0, 7),
    freq("t2-freq-end", "T2 End Freq.", 1000.0, 30.0, 8),
    curve("t2-freq-curve", "T2 Freq. Curve", 9),
    level("t-volume", "T Volume", 0.8, 10),
    decay("t-decay", "T Decay", 11),
    curve("t-vol-curve", "T Vol. Curve", 12),
    ParamDescriptor::choice("t-combine", "T Combine", COMBINE_TYPES, 0).with_id(ParamId(13)),
    ParamDescriptor::choice("n-wave", "Noise waveform", NOISE_WAVES, 1).with_id(ParamId(14)),
    level("n-volume", "N Volume", 0.8, 15),
    decay("n-decay", "N Decay", 16),
    curve("n-vol-curve", "N Vol. Curve", 17),
    ParamDescriptor::choice("filter-routing", "Filter routing", FILTER_ROUTINGS, 0)
        .with_id(ParamId(18)),
    ParamDescriptor::choice("filter", "Filter type", FILTER_TYPES, 1).with_id(ParamId(19)),
    level("cutoff-start", "Start Cut-Off", 0.8, 20),
    level("cutoff-end", "End Cut-Off", 0.2, 21),
    curve("cutoff-curve", "Cut-Off Curve", 22),
    ParamDescriptor::continuous(
        "resonance",
        "Resonance",
        ParamUnit::None,
        MIN_RESONANCE,
        MAX_RESONANCE,
        0.8,
    )
    .with_id(ParamId(23)),
];

/// Index of the parameter called `name` (case-insensitive).
pub fn param_index(name: &str) -> Option<usize> {
    PARAMS.iter().position(|d| d.name.eq_ignore_ascii_case(name))
}

/// Descriptor of the parameter called `name`.
pub fn descriptor(name: &str) -> Option<&'static ParamDescriptor> {
    param_index(name).map(|i| &PARAMS[i])
}

/// Typed parameter write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrumParam {
    /// Fire a note with `value / 128` volume; 0 is ignored.
    Volume(u32),
    /// Wave of tonal oscillator 1.
    T1Wave(Wave),
    /// Start frequency of tone 1 in Hz.
    T1FreqStart(f64),
    /// End frequency of tone 1 in Hz.
    T1FreqEnd(f64),
    /// Pitch curve of tone 1.
    T1FreqCurve(f64),
    /// Wave of tonal oscillator 2.
    T2Wave(Wave),
    /// Start frequency of tone 2 in Hz.
    T2FreqStart(f64),
    /// End frequency of tone 2 in Hz.
    T2FreqEnd(f64),
    /// Pitch curve of tone 2.
    T2FreqCurve(f64),
    /// Peak volume of the tonal part.
    TVolume(f64),
    /// Decay of the tonal part in seconds.
    TDecay(f64),
    /// Volume curve of the tonal part.
    TVolCurve(f64),
    /// Operator merging the two tones.
    TCombine(CombineType),
    /// Wave of the noise oscillator.
    NWave(Wave),
    /// Peak volume of the noise part.
    NVolume(f64),
    /// Decay of the noise part in seconds.
    NDecay(f64),
    /// Volume curve of the noise part.
    NVolCurve(f64),
    /// Which parts the filter is applied to.
    FilterRouting(FilterRouting),
    /// Filter response.
    Filter(FilterType),
    /// Cutoff at trigger time.
    CutoffStart(f64),
    /// Cutoff after the decay.
    CutoffEnd(f64),
    /// Cutoff curve.
    CutoffCurve(f64),
    /// Filter resonance.
    Resonance(f64),
}

impl DrumParam {
    /// Build a write for parameter `index` from a plain value.
    ///
    /// The value is clamped to the descriptor's range first; enumerated
    /// parameters take a choice index. Returns `None` for an unknown index
    /// or a non-finite value.
    pub fn from_value(index: usize, value: f64) -> Option<Self> {
        let desc = PARAMS.get(index)?;
        if !value.is_finite() {
            return None;
        }
        let v = desc.clamp(value);
        let choice = v as usize;
        Some(match index {
            0 => DrumParam::Volume(v as u32),
            1 => DrumParam::T1Wave(*Wave::TONAL.get(choice)?),
            2 => DrumParam::T1FreqStart(v),
            3 => DrumParam::T1FreqEnd(v),
            4 => DrumParam::T1FreqCurve(v),
            5 => DrumParam::T2Wave(*Wave::TONAL.get(choice)?),
            6 => DrumParam::T2FreqStart(v),
            7 => DrumParam::T2FreqEnd(v),
            8 => DrumParam::T2FreqCurve(v),
            9 => DrumParam::TVolume(v),
            10 => DrumParam::TDecay(v),
            11 => DrumParam::TVolCurve(v),
            12 => DrumParam::TCombine(CombineType::from_index(choice)?),
            13 => DrumParam::NWave(*Wave::NOISE.get(choice)?),
            14 => DrumParam::NVolume(v),
            15 => DrumParam::NDecay(v),
            16 => DrumParam::NVolCurve(v),
            17 => DrumParam::FilterRouting(FilterRouting::from_index(choice)?),
            18 => DrumParam::Filter(FilterType::from_index(choice)?),
            19 => DrumParam::CutoffStart(v),
            20 => DrumParam::CutoffEnd(v),
            21 => DrumParam::CutoffCurve(v),
            22 => DrumParam::Resonance(v),
            _ => return None,
        })
    }

    /// Index of the parameter this write targets.
    pub fn index(&self) -> usize {
        match self {
            DrumParam::Volume(_) => 0,
            DrumParam::T1Wave(_) => 1,
            DrumParam::T1FreqStart(_) => 2,
            DrumParam::T1FreqEnd(_) => 3,
            DrumParam::T1FreqCurve(_) => 4,
            DrumParam::T2Wave(_) => 5,
            DrumParam::T2FreqStart(_) => 6,
            DrumParam::T2FreqEnd(_) => 7,
            DrumParam::T2FreqCurve(_) => 8,
            DrumParam::TVolume(_) => 9,
            DrumParam::TDecay(_) => 10,
            DrumParam::TVolCurve(_) => 11,
            DrumParam::TCombine(_) => 12,
            DrumParam::NWave(_) => 13,
            DrumParam::NVolume(_) => 14,
            DrumParam::NDecay(_) => 15,
            DrumParam::NVolCurve(_) => 16,
            DrumParam::FilterRouting(_) => 17,
            DrumParam::Filter(_) => 18,
            DrumParam::CutoffStart(_) => 19,
            DrumParam::CutoffEnd(_) => 20,
            DrumParam::CutoffCurve(_) => 21,
            DrumParam::Resonance(_) => 22,
        }
    }

    /// Descriptor of the targeted parameter.
    pub fn descriptor(&self) -> &'static ParamDescriptor {
        &PARAMS[self.index()]
    }
}
