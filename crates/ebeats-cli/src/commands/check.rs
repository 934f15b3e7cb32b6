//! Patch validation command.

use anyhow::{Result, bail};
use clap::Args;
use ebeats_config::{Patch, ValidationError};
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Patch file to validate
    #[arg(value_name = "PATCH")]
    patch: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let patch = Patch::load(&args.patch)?;
    match patch.validate() {
        Ok(()) => {
            println!(
                "{}: ok ('{}', {} parameters)",
                args.patch.display(),
                patch.name,
                patch.len()
            );
            Ok(())
        }
        Err(err) => {
            let errors = match err {
                ValidationError::Multiple(errors) => errors,
                single => vec![single],
            };
            for e in &errors {
                eprintln!("{}: {e}", args.patch.display());
            }
            bail!("{} problem(s) in {}", errors.len(), args.patch.display())
        }
    }
}
