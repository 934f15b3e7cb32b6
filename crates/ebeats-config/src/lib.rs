//! Patch files for the ebeats drum synth.
//!
//! A patch is a TOML file naming parameter values of
//! [`EBeats`](ebeats_synth::EBeats). Loading one is a series of ordinary
//! parameter writes; saving one reads the parameters back. The instrument
//! itself knows nothing about files.
//!
//! # Features
//!
//! - **Patches**: load, save, capture from a live instrument, apply to one
//! - **Validation**: names, ranges and choice nicks checked against the
//!   parameter table, all failures reported at once
//!
//! # Example
//!
//! ```rust,no_run
//! use ebeats_config::Patch;
//!
//! let patch = Patch::new("Clap")
//!     .with_description("Filtered noise burst")
//!     .with_param("t-volume", 0.0)
//!     .with_param("n-wave", "white-noise")
//!     .with_param("n-decay", 0.12)
//!     .with_param("filter", "bandpass");
//! patch.save("patches/clap.toml").unwrap();
//!
//! let drum = Patch::load("patches/clap.toml").unwrap().build().unwrap();
//! assert_eq!(drum.n_decay(), 0.12);
//! ```

mod error;
mod patch;

/// Patch validation against the parameter table.
pub mod validation;

pub use error::ConfigError;
pub use patch::{Patch, PatchValue, TempoConfig};
pub use validation::{ValidationError, ValidationResult, validate_param, validate_params};
