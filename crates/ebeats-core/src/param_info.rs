//! Parameter introspection for instruments.
//!
//! An instrument describes each of its parameters with a [`ParamDescriptor`]
//! and exposes them by index through [`ParameterInfo`]. Hosts, patch files
//! and the command line all go through this table, so a parameter only has
//! to be described once.
//!
//! Values are plain `f64`. Enumerated parameters carry their choice nicks
//! and take the choice index as value; write-only parameters read back as
//! their default.
//!
//! # Example
//!
//! ```rust
//! use ebeats_core::{ParamDescriptor, ParamId, ParamUnit, ParameterInfo};
//!
//! struct Click {
//!     decay: f64,
//! }
//!
//! const DECAY: ParamDescriptor =
//!     ParamDescriptor::continuous("decay", "Decay", ParamUnit::Seconds, 0.001, 4.0, 0.5)
//!         .with_id(ParamId(1));
//!
//! impl ParameterInfo for Click {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         (index == 0).then_some(DECAY)
//!     }
//!
//!     fn get_param(&self, index: usize) -> f64 {
//!         if index == 0 { self.decay } else { 0.0 }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f64) {
//!         if index == 0 {
//!             self.decay = DECAY.clamp(value);
//!         }
//!     }
//! }
//!
//! let mut click = Click { decay: 0.5 };
//! let i = click.find_param_by_name("decay").unwrap();
//! click.set_param(i, 10.0);
//! assert_eq!(click.get_param(i), 4.0);
//! ```

/// Stable parameter identifier that survives reordering of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
///
/// ```rust
/// use ebeats_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::WRITE_ONLY));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host may automate the parameter.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Only integer values are meaningful.
    pub const STEPPED: Self = Self(1 << 1);
    /// Writes have an effect but the value cannot be read back.
    pub const WRITE_ONLY: Self = Self(1 << 2);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit used when displaying a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Frequency in Hz.
    Hertz,
    /// Time in seconds.
    Seconds,
    /// Plain 0..1 ratio.
    Ratio,
    /// Unitless.
    #[default]
    None,
}

impl ParamUnit {
    /// Suffix appended to formatted values.
    pub fn suffix(self) -> &'static str {
        match self {
            ParamUnit::Hertz => " Hz",
            ParamUnit::Seconds => " s",
            ParamUnit::Ratio | ParamUnit::None => "",
        }
    }
}

/// How a parameter's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any value in `min..=max`.
    Continuous,
    /// Integer values in `min..=max`.
    Stepped,
    /// Index into [`ParamDescriptor::choices`].
    Choice,
    /// Write-only event; a non-zero write fires it.
    Trigger,
}

/// Metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable name used by patches and the command line (e.g. `"t-decay"`).
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
    /// Value after construction.
    pub default: f64,
    /// Stable numeric id.
    pub id: ParamId,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Choice nicks for enumerated parameters, indexed by value.
    pub choices: &'static [&'static str],
}

impl ParamDescriptor {
    /// A continuous parameter.
    pub const fn continuous(
        name: &'static str,
        label: &'static str,
        unit: ParamUnit,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            label,
            unit,
            min,
            max,
            default,
            id: ParamId(0),
            flags: ParamFlags::AUTOMATABLE,
            choices: &[],
        }
    }

    /// An enumerated parameter over `choices`; `default` is a choice index.
    pub const fn choice(
        name: &'static str,
        label: &'static str,
        choices: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            name,
            label,
            unit: ParamUnit::None,
            min: 0.0,
            max: choices.len().saturating_sub(1) as f64,
            default: default as f64,
            id: ParamId(0),
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
            choices,
        }
    }

    /// A write-only integer trigger in `0..=max`.
    pub const fn trigger(name: &'static str, label: &'static str, max: u32) -> Self {
        Self {
            name,
            label,
            unit: ParamUnit::None,
            min: 0.0,
            max: max as f64,
            default: 0.0,
            id: ParamId(0),
            flags: ParamFlags::STEPPED.union(ParamFlags::WRITE_ONLY),
            choices: &[],
        }
    }

    /// Set the stable id.
    pub const fn with_id(mut self, id: ParamId) -> Self {
        self.id = id;
        self
    }

    /// Replace the flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// How the value is interpreted.
    pub fn kind(&self) -> ParamKind {
        if self.flags.contains(ParamFlags::WRITE_ONLY) {
            ParamKind::Trigger
        } else if !self.choices.is_empty() {
            ParamKind::Choice
        } else if self.flags.contains(ParamFlags::STEPPED) {
            ParamKind::Stepped
        } else {
            ParamKind::Continuous
        }
    }

    /// Whether the value can be read back.
    pub fn is_readable(&self) -> bool {
        !self.flags.contains(ParamFlags::WRITE_ONLY)
    }

    /// Clamp `value` into range, rounding stepped kinds.
    ///
    /// Non-finite input yields the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        let v = value.clamp(self.min, self.max);
        if self.flags.contains(ParamFlags::STEPPED) {
            libm::round(v)
        } else {
            v
        }
    }

    /// Map a value to `0..=1`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            0.0
        } else {
            (self.clamp(value) - self.min) / span
        }
    }

    /// Map `0..=1` back to a value.
    pub fn denormalize(&self, normalized: f64) -> f64 {
        self.clamp(self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min))
    }

    /// Index of a choice nick.
    pub fn choice_index(&self, nick: &str) -> Option<usize> {
        self.choices.iter().position(|c| *c == nick)
    }

    /// Nick of the choice selected by `value`.
    pub fn choice_nick(&self, value: f64) -> Option<&'static str> {
        if self.choices.is_empty() || !value.is_finite() || value < 0.0 {
            return None;
        }
        self.choices.get(libm::round(value) as usize).copied()
    }
}

/// Instruments that expose an indexed parameter table.
///
/// Indices are stable for the lifetime of the instance; valid indices are
/// `0..param_count()`.
pub trait ParameterInfo {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Descriptor at `index`, or `None` when out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value at `index`.
    ///
    /// Out-of-range indices read as `0.0`; write-only parameters read as
    /// their default.
    fn get_param(&self, index: usize) -> f64;

    /// Write `value` at `index`, clamped to the descriptor's range.
    /// Out-of-range indices are ignored.
    fn set_param(&mut self, index: usize, value: f64);

    /// Find a parameter by name (case-insensitive).
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i)
                .is_some_and(|d| d.name.eq_ignore_ascii_case(name))
        })
    }

    /// Find a parameter by its stable [`ParamId`].
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}
