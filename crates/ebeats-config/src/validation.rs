//! Patch validation against the drum synth's parameter table.
//!
//! Every key of a patch must name a parameter in
//! [`PARAMS`](ebeats_synth::PARAMS). Numbers must lie in the parameter's
//! range; enumerated parameters take a choice nick or a choice index.
//!
//! # Example
//!
//! ```rust
//! use ebeats_config::{PatchValue, validate_param};
//!
//! assert!(validate_param("t-decay", &PatchValue::Number(0.2)).is_ok());
//! assert!(validate_param("n-wave", &PatchValue::from("pink-noise")).is_ok());
//! assert!(validate_param("t-decay", &PatchValue::Number(9.0)).is_err());
//! ```

use ebeats_core::{ParamDescriptor, ParamKind};
use ebeats_synth::{ParamError, descriptor};
use thiserror::Error;

use crate::patch::PatchValue;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// No parameter has this name.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Nick that names no choice of an enumerated parameter.
    #[error("invalid choice '{value}' for parameter '{param}' (expected one of: {choices})")]
    InvalidChoice {
        /// Name of the parameter.
        param: String,
        /// The rejected nick.
        value: String,
        /// Accepted nicks, comma separated.
        choices: String,
    },

    /// Value of the wrong kind, e.g. text for a numeric parameter.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ParamError> for ValidationError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::UnknownParameter(name) => ValidationError::UnknownParameter(name),
            ParamError::InvalidValue { param, value } => ValidationError::InvalidFormat {
                param,
                reason: format!("{value} is not a finite number"),
            },
            ParamError::UnknownChoice { param, nick } => {
                let choices = descriptor(&param).map(choice_list).unwrap_or_default();
                ValidationError::InvalidChoice {
                    param,
                    value: nick,
                    choices,
                }
            }
            ParamError::WriteOnly(param) => ValidationError::InvalidFormat {
                param,
                reason: "parameter is write-only".to_string(),
            },
        }
    }
}

fn choice_list(desc: &ParamDescriptor) -> String {
    desc.choices.join(", ")
}

/// Validate one `name = value` entry of a patch.
pub fn validate_param(name: &str, value: &PatchValue) -> ValidationResult<()> {
    let desc =
        descriptor(name).ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?;

    match value {
        PatchValue::Nick(nick) if desc.kind() == ParamKind::Choice => {
            if desc.choice_index(nick).is_some() {
                Ok(())
            } else {
                Err(ValidationError::InvalidChoice {
                    param: name.to_string(),
                    value: nick.clone(),
                    choices: choice_list(desc),
                })
            }
        }
        PatchValue::Nick(text) => {
            let number: f64 = text.trim().parse().map_err(|_| ValidationError::InvalidFormat {
                param: name.to_string(),
                reason: format!("expected a number, got '{text}'"),
            })?;
            check_range(name, desc, number)
        }
        PatchValue::Number(number) => check_range(name, desc, *number),
    }
}

fn check_range(name: &str, desc: &ParamDescriptor, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value >= desc.min && value <= desc.max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: name.to_string(),
            value,
            min: desc.min,
            max: desc.max,
        })
    }
}

/// Validate a set of entries, collecting every failure.
pub fn validate_params<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a PatchValue)>,
) -> ValidationResult<()> {
    let mut errors: Vec<ValidationError> = entries
        .into_iter()
        .filter_map(|(name, value)| validate_param(name, value).err())
        .collect();

    for err in &errors {
        tracing::warn!(%err, "patch entry rejected");
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_pass() {
        assert!(validate_param("t1-freq-start", &PatchValue::Number(440.0)).is_ok());
        assert!(validate_param("filter", &PatchValue::from("bandpass")).is_ok());
        assert!(validate_param("filter", &PatchValue::Number(2.0)).is_ok());
        assert!(validate_param("resonance", &PatchValue::from("3.5")).is_ok());
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            validate_param("cufoff-curve", &PatchValue::Number(0.5)),
            Err(ValidationError::UnknownParameter("cufoff-curve".into()))
        );
    }

    #[test]
    fn test_out_of_range() {
        let err = validate_param("cutoff-start", &PatchValue::Number(1.5)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                param: "cutoff-start".into(),
                value: 1.5,
                min: 0.0,
                max: 1.0,
            }
        );
        assert!(validate_param("t-decay", &PatchValue::Number(f64::NAN)).is_err());
        assert!(
            validate_param("t-combine", &PatchValue::Number(9.0)).is_err(),
            "choice index past the last entry"
        );
    }

    #[test]
    fn test_invalid_choice_lists_choices() {
        let err = validate_param("n-wave", &PatchValue::from("sine")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'sine'"), "got: {msg}");
        assert!(msg.contains("white-noise, pink-noise"), "got: {msg}");
    }

    #[test]
    fn test_text_for_numeric_param() {
        let err = validate_param("t-volume", &PatchValue::from("loud")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_collects_multiple() {
        let a = PatchValue::Number(0.5);
        let b = PatchValue::Number(99.0);
        let c = PatchValue::from("nope");
        let result = validate_params([("t-decay", &a), ("n-decay", &b), ("filter", &c)]);
        match result {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected two errors, got {other:?}"),
        }
        assert!(validate_params([("t-decay", &a)]).is_ok());
    }

    #[test]
    fn test_from_param_error() {
        let err: ValidationError = ParamError::UnknownChoice {
            param: "filter".into(),
            nick: "comb".into(),
        }
        .into();
        assert_eq!(
            err,
            ValidationError::InvalidChoice {
                param: "filter".into(),
                value: "comb".into(),
                choices: "none, lowpass, hipass, bandpass, bandstop".into(),
            }
        );
    }
}
