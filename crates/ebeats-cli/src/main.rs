//! ebeats CLI - render drum hits and patterns from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ebeats")]
#[command(author, version, about = "ebeats drum synth CLI", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a hit or a pattern to a WAV file
    Render(commands::render::RenderArgs),

    /// List the drum synth parameters
    Params(commands::params::ParamsArgs),

    /// Validate a patch file
    Check(commands::check::CheckArgs),

    /// Write a patch file with the default sound
    Init(commands::init::InitArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Init(args) => commands::init::run(args),
    }
}
