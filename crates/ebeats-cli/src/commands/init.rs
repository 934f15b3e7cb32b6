//! Patch creation command.

use anyhow::{Result, bail};
use clap::Args;
use ebeats_config::Patch;
use std::path::PathBuf;

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the patch
    #[arg(value_name = "PATCH")]
    patch: PathBuf,

    /// Patch name [default: the file stem]
    #[arg(long)]
    name: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    if args.patch.exists() && !args.force {
        bail!("{} exists, pass --force to overwrite", args.patch.display());
    }
    let name = args.name.unwrap_or_else(|| {
        args.patch
            .file_stem()
            .map_or_else(|| "default".to_string(), |s| s.to_string_lossy().into_owned())
    });
    let mut patch = Patch::default();
    patch.name = name;
    patch.save(&args.patch)?;
    println!("Wrote {} ({} parameters)", args.patch.display(), patch.len());
    Ok(())
}
