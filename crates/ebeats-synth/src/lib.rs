//! ebeats Synth - the electric drum instrument built from ebeats-core units
//!
//! This crate wires oscillators, envelopes, a combiner and a filter into a
//! playable drum voice, and provides the host side that drives it.
//!
//! # Instrument
//!
//! - [`EBeats`] - two pitch-swept tones plus a noise part, through one
//!   state-variable filter with its own cutoff sweep
//! - [`FilterRouting`] - which parts the filter is applied to
//!
//! ```rust
//! use ebeats_synth::{AudioSynth, EBeats};
//!
//! let mut kick = EBeats::new();
//! kick.setup(48_000);
//! kick.set_t1_freq_start(150.0);
//! kick.set_t1_freq_end(40.0);
//! kick.set_n_volume(0.1);
//! kick.trigger(128);
//!
//! let mut buf = vec![0i16; 480];
//! assert!(kick.process(&mut buf));
//! ```
//!
//! # Parameters
//!
//! - [`PARAMS`] - names, ranges, units and defaults in a stable order
//! - [`DrumParam`] - a typed write, built from a plain value with clamping
//! - [`ParamError`] - failures of by-name access
//!
//! # Hosting
//!
//! - [`AudioSynth`] - the setup / reset / process contract
//! - [`SynthRenderer`] - renders buffers on the tick grid and reports gaps
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ebeats-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod audio_synth;
pub mod ebeats;
pub mod params;

pub use audio_synth::{AudioSynth, RenderedBuffer, SynthRenderer};
pub use ebeats::{DEFAULT_BUFFER_LEN, EBeats, FilterRouting};
pub use params::{
    COMBINE_TYPES, DrumParam, FILTER_ROUTINGS, FILTER_TYPES, NOISE_WAVES, PARAMS, ParamError,
    TONAL_WAVES, descriptor, param_index,
};
