//! ebeats Core - sample-buffer DSP units for drum synthesis
//!
//! This crate provides the leaf units the ebeats instruments are wired from.
//! Every unit renders signed 16-bit buffers, computes in `f64`, and never
//! allocates or blocks inside `process()`.
//!
//! # Units
//!
//! - [`OscSynth`] - tonal waves, six noise families, and random-step waves
//! - [`Envelope`] - one-shot curve-shaped decay, read by offset
//! - [`FilterSvf`] - Chamberlin state-variable filter with an optional
//!   cutoff envelope
//! - [`Combine`] - nine sample-wise operators merging two buffers
//!
//! Envelopes are bound to oscillators and filters per call by shared
//! reference ([`OscControl`]), so a reader can never mutate the envelope it
//! follows. Bound control values are re-read every [`INNER_LOOP`] samples on
//! an absolute grid, which makes output independent of how a host splits
//! its buffers.
//!
//! # Host Plumbing
//!
//! - [`TriggerCell`] - lock-free one-shot trigger from a control thread
//! - [`BufferClock`] / [`Tempo`] - buffer lengths on the musical tick grid
//! - [`ParameterInfo`] / [`ParamDescriptor`] - indexed parameter tables
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for embedded targets:
//!
//! ```toml
//! [dependencies]
//! ebeats-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use ebeats_core::{Envelope, FilterSvf, OscControl, OscSynth, Wave};
//!
//! let mut volume = Envelope::new().with_decay(0.1);
//! volume.setup(44_100);
//! volume.reset();
//!
//! let mut osc = OscSynth::new();
//! osc.set_wave(Wave::Saw);
//! osc.set_frequency(110.0);
//!
//! let mut filter = FilterSvf::new();
//! filter.set_cutoff(0.3);
//!
//! let mut buf = [0i16; 256];
//! osc.process(&mut buf, OscControl::new().volume(&volume));
//! filter.process(&mut buf, None);
//! assert!(buf.iter().any(|&s| s != 0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod combine;
pub mod envelope;
pub mod filter_svf;
pub mod math;
pub mod osc_synth;
pub mod param_info;
pub mod tempo;
pub mod trigger;

pub use combine::{Combine, CombineType};
pub use envelope::{DEFAULT_DECAY, Envelope, LINEAR_CURVE, MAX_DECAY, MIN_DECAY};
pub use filter_svf::{FilterSvf, FilterType, MAX_RESONANCE, MIN_RESONANCE};
pub use math::{
    DEFAULT_SAMPLE_RATE, INNER_LOOP, SAMPLE_MAX, SAMPLE_MIN, flush_denormal, is_silent, peak,
    saturate, sub_blocks, to_sample,
};
pub use osc_synth::{DEFAULT_SEED, OscControl, OscSynth, Wave};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamKind, ParamUnit, ParameterInfo};
pub use tempo::{BufferClock, BufferSlot, Tempo};
#[cfg(feature = "std")]
pub use trigger::SharedTrigger;
pub use trigger::{TriggerCell, TriggerState};
