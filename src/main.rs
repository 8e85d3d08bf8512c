mod callpeaks;
mod error;
mod peaks;
mod util;

use anyhow;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about=None)]
#[command(propagate_version = true)]
///
/// chipseqpeaks
///
struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Call peaks with MACS2 and write them under <OUTPUT_DIR>/<NAME>
    Callpeaks(callpeaks::CallPeaksArgs),
}

/// main CLI for chipseqpeaks
///
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    /////////////////////////
    // set up event logger //
    /////////////////////////
    let level = match cli.verbose {
        true => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    match &cli.commands {
        Commands::Callpeaks(args) => {
            callpeaks::run(args)?;
        }
    }
    Ok(())
}
