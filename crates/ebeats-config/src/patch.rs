//! Patch file format and operations.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ebeats_core::{ParamKind, ParameterInfo, Tempo};
use ebeats_synth::{EBeats, PARAMS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_params};

/// One parameter value in a patch: a number or a choice nick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PatchValue {
    /// Plain value, or a choice index for enumerated parameters.
    Number(f64),
    /// Choice nick such as `"white-noise"`, or a number written as text.
    Nick(String),
}

impl From<f64> for PatchValue {
    fn from(value: f64) -> Self {
        PatchValue::Number(value)
    }
}

impl From<&str> for PatchValue {
    fn from(nick: &str) -> Self {
        PatchValue::Nick(nick.to_string())
    }
}

impl fmt::Display for PatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchValue::Number(v) => write!(f, "{v}"),
            PatchValue::Nick(s) => f.write_str(s),
        }
    }
}

/// Tempo section of a patch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TempoConfig {
    /// Beats per minute.
    pub bpm: u32,
    /// Ticks per beat.
    pub tpb: u32,
    /// Subticks per tick.
    pub stpb: u32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        let tempo = Tempo::default();
        Self {
            bpm: tempo.bpm,
            tpb: tempo.tpb,
            stpb: tempo.stpb,
        }
    }
}

impl From<TempoConfig> for Tempo {
    fn from(config: TempoConfig) -> Self {
        Tempo::new(config.bpm, config.tpb, config.stpb)
    }
}

/// A stored drum sound.
///
/// Patches hold parameter values by name. Loading a patch is a series of
/// parameter writes; saving one reads every readable parameter back.
///
/// # TOML Format
///
/// ```toml
/// name = "Tight Kick"
/// description = "Short sine thump"
/// sample_rate = 44100
///
/// [tempo]
/// bpm = 120
/// tpb = 4
/// stpb = 1
///
/// [params]
/// t1-freq-start = 150.0
/// t1-freq-end = 40.0
/// t-decay = 0.2
/// n-wave = "pink-noise"
/// filter = "lowpass"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate hint for rendering (defaults to 44100).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Tick grid used for pattern rendering.
    #[serde(default)]
    pub tempo: TempoConfig,

    /// Parameter values by name.
    #[serde(default)]
    pub params: BTreeMap<String, PatchValue>,
}

fn default_sample_rate() -> u32 {
    ebeats_core::DEFAULT_SAMPLE_RATE
}

impl Patch {
    /// Create an empty patch; unset parameters keep their defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            tempo: TempoConfig::default(),
            params: BTreeMap::new(),
        }
    }

    /// Create a patch with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set one parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<PatchValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the tick grid.
    pub fn with_tempo(mut self, tempo: Tempo) -> Self {
        self.tempo = TempoConfig {
            bpm: tempo.bpm,
            tpb: tempo.tpb,
            stpb: tempo.stpb,
        };
        self
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let patch = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            name = %patch.name,
            params = patch.params.len(),
            "loaded patch"
        );
        Ok(patch)
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::info!(path = %path.display(), name = %self.name, "saved patch");
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every parameter against the parameter table.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_params(self.params.iter().map(|(k, v)| (k.as_str(), v)))?;
        if self.sample_rate == 0 {
            return Err(crate::ValidationError::OutOfRange {
                param: "sample_rate".to_string(),
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        Ok(())
    }

    /// Validate, then write every parameter into `drum`.
    ///
    /// Trigger parameters such as `volume` are skipped: a patch sets up a
    /// sound, it does not play it.
    pub fn apply(&self, drum: &mut EBeats) -> Result<(), ConfigError> {
        self.validate()?;
        for (name, value) in &self.params {
            let kind = ebeats_synth::descriptor(name).map(|d| d.kind());
            if kind == Some(ParamKind::Trigger) {
                tracing::warn!(param = %name, "trigger parameter in patch ignored");
                continue;
            }
            match value {
                PatchValue::Number(v) => drum.set_param_by_name(name, *v),
                PatchValue::Nick(nick) if kind == Some(ParamKind::Choice) => {
                    drum.set_param_nick(name, nick)
                }
                PatchValue::Nick(text) => {
                    // validate() already proved the text parses.
                    let v = text.trim().parse::<f64>().unwrap_or(f64::NAN);
                    drum.set_param_by_name(name, v)
                }
            }
            .map_err(crate::ValidationError::from)?;
        }
        Ok(())
    }

    /// Read every readable parameter of `drum` into a new patch.
    ///
    /// Enumerated parameters are stored by nick.
    pub fn capture(name: impl Into<String>, drum: &EBeats) -> Self {
        let mut patch = Self::new(name).with_sample_rate(drum.sample_rate());
        for (index, desc) in PARAMS.iter().enumerate() {
            if !desc.is_readable() {
                continue;
            }
            let value = drum.get_param(index);
            let entry = match desc.kind() {
                ParamKind::Choice => desc
                    .choice_nick(value)
                    .map_or(PatchValue::Number(value), PatchValue::from),
                _ => PatchValue::Number(value),
            };
            patch.params.insert(desc.name.to_string(), entry);
        }
        patch
    }

    /// Build an instrument from this patch, set up at its sample rate.
    pub fn build(&self) -> Result<EBeats, ConfigError> {
        use ebeats_synth::AudioSynth;

        let mut drum = EBeats::new();
        drum.setup(self.sample_rate);
        self.apply(&mut drum)?;
        Ok(drum)
    }

    /// Number of parameters set.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if the patch sets no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::capture("default", &EBeats::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebeats_core::Wave;
    use ebeats_synth::FilterRouting;

    #[test]
    fn test_parse_minimal() {
        let patch = Patch::from_toml(r#"name = "Empty""#).unwrap();
        assert_eq!(patch.name, "Empty");
        assert_eq!(patch.sample_rate, 44_100);
        assert_eq!(patch.tempo, TempoConfig::default());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_parse_numbers_and_nicks() {
        let toml = r#"
            name = "Snare"
            sample_rate = 48000

            [tempo]
            bpm = 90

            [params]
            t-decay = 0.15
            t1-freq-start = 300
            n-wave = "gaussian-noise"
            filter-routing = "noise"
        "#;
        let patch = Patch::from_toml(toml).unwrap();
        assert_eq!(patch.tempo.bpm, 90);
        assert_eq!(patch.tempo.tpb, 4, "missing tempo fields default");
        assert_eq!(patch.params["t1-freq-start"], PatchValue::Number(300.0));
        assert_eq!(patch.params["n-wave"], PatchValue::from("gaussian-noise"));
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_apply_writes_parameters() {
        let patch = Patch::new("Test")
            .with_param("t-decay", 0.25)
            .with_param("n-wave", "red-noise")
            .with_param("filter-routing", "tonal")
            .with_param("resonance", "2.5");
        let mut drum = EBeats::new();
        patch.apply(&mut drum).unwrap();
        assert_eq!(drum.t_decay(), 0.25);
        assert_eq!(drum.n_wave(), Wave::RedNoise);
        assert_eq!(drum.filter_routing(), FilterRouting::Tonal);
        assert_eq!(drum.resonance(), 2.5);
        assert_eq!(drum.filter_decay(), 0.25, "routing drives the filter decay");
    }

    #[test]
    fn test_apply_rejects_invalid_without_writing() {
        let patch = Patch::new("Bad")
            .with_param("t-decay", 0.25)
            .with_param("t1-wave", "pink-noise");
        let mut drum = EBeats::new();
        assert!(matches!(
            patch.apply(&mut drum),
            Err(ConfigError::Validation(_))
        ));
        assert_eq!(drum.t_decay(), 0.5, "nothing written on failure");
    }

    #[test]
    fn test_apply_skips_volume() {
        let patch = Patch::new("Loud").with_param("volume", 100.0);
        let mut drum = EBeats::new();
        patch.apply(&mut drum).unwrap();
        assert_eq!(drum.volume(), 0.0, "a patch never fires a note");
    }

    #[test]
    fn test_capture_reads_every_readable_parameter() {
        let mut drum = EBeats::new();
        drum.set_n_wave(Wave::VioletNoise);
        drum.set_t2_freq_end(55.0);
        let patch = Patch::capture("Captured", &drum);
        assert_eq!(patch.len(), PARAMS.len() - 1, "volume is write-only");
        assert!(!patch.params.contains_key("volume"));
        assert_eq!(patch.params["n-wave"], PatchValue::from("violet-noise"));
        assert_eq!(patch.params["t2-freq-end"], PatchValue::Number(55.0));
        assert_eq!(patch.params["t-combine"], PatchValue::from("mix"));
    }

    #[test]
    fn test_capture_then_build_restores_the_sound() {
        let mut drum = EBeats::new();
        drum.set_t1_wave(Wave::Triangle);
        drum.set_cutoff_curve(0.2);
        drum.set_filter_routing(FilterRouting::Noise);
        let restored = Patch::capture("x", &drum).build().unwrap();
        for i in 1..PARAMS.len() {
            assert_eq!(restored.get_param(i), drum.get_param(i), "{}", PARAMS[i].name);
        }
    }

    #[test]
    fn test_default_patch_is_valid() {
        let patch = Patch::default();
        assert!(patch.validate().is_ok());
        assert_eq!(patch.params["filter"], PatchValue::from("lowpass"));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let patch = Patch::new("x").with_sample_rate(0);
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_tempo_conversion_clamps() {
        let tempo: Tempo = TempoConfig { bpm: 0, tpb: 4, stpb: 2 }.into();
        assert_eq!(tempo.bpm, 1);
        assert_eq!(tempo.stpb, 2);
    }
}
