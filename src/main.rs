//! MPF Playfield - headless playfield layout tool
//!
//! Lists, places and removes device widgets in a playfield layout without
//! starting the monitor.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpf_playfield::cli::{
    CliResult, GlobalOptions, InspectorArgs, ListArgs, PlaceArgs, RemoveArgs, ResetSizesArgs,
};

/// MPF Playfield - headless playfield layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List placed widgets
    List(ListArgs),
    /// Place a device on the playfield
    Place(PlaceArgs),
    /// Remove a device from the playfield
    Remove(RemoveArgs),
    /// Reset widget sizes to the default
    ResetSizes(ResetSizesArgs),
    /// Turn inspector mode on or off
    Inspector(InspectorArgs),
}

impl Command {
    fn execute(&self, options: &GlobalOptions) -> CliResult<()> {
        match self {
            Self::List(args) => args.execute(options),
            Self::Place(args) => args.execute(options),
            Self::Remove(args) => args.execute(options),
            Self::ResetSizes(args) => args.execute(options),
            Self::Inspector(args) => args.execute(options),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so JSON output stays clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = GlobalOptions { config: cli.config };

    if let Err(e) = cli.command.execute(&options) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code() as i32);
    }
}
