//! Helpers shared by the CLI commands.

use anyhow::{Context, Result, bail};
use ebeats_config::{Patch, PatchValue};
use std::path::Path;

/// Parse a `name=value` override. Numbers stay numbers, anything else is
/// taken as a choice nick.
pub fn parse_set(s: &str) -> Result<(String, PatchValue)> {
    let (name, value) = s
        .split_once('=')
        .with_context(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        bail!("expected name=value, got '{s}'");
    }
    let value = value
        .parse::<f64>()
        .map_or_else(|_| PatchValue::from(value), PatchValue::Number);
    Ok((name.to_string(), value))
}

/// Load `path`, or start from an empty patch, then layer the overrides on.
pub fn load_patch(path: Option<&Path>, overrides: &[String]) -> Result<Patch> {
    let mut patch = match path {
        Some(path) => {
            Patch::load(path).with_context(|| format!("loading patch {}", path.display()))?
        }
        None => Patch::new("command line"),
    };
    for set in overrides {
        let (name, value) = parse_set(set)?;
        patch.params.insert(name, value);
    }
    Ok(patch)
}

/// Parse a pattern string: `x` is a hit, `.` or `-` a rest. Spaces and
/// `|` bar lines are ignored.
pub fn parse_pattern(pattern: &str) -> Result<Vec<bool>> {
    let steps = pattern
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '|')
        .map(|c| match c {
            'x' | 'X' => Ok(true),
            '.' | '-' => Ok(false),
            other => bail!("invalid pattern step '{other}', use 'x' or '.'"),
        })
        .collect::<Result<Vec<_>>>()?;
    if steps.is_empty() {
        bail!("pattern is empty");
    }
    Ok(steps)
}
