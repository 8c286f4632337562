mod build;
mod densify;
mod prompt;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use spacetime_gmaps::GmapsError;

use crate::build::BuildArgs;
use crate::prompt::Cancelled;

#[derive(Debug, Parser)]
#[command(name = "spacetime")]
#[command(about = "Build travel-time grids for the spacetime map")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Snap a grid to roads, query travel times and export it for the frontend
    Build(BuildArgs),
    /// Fill in `dense_travel_times` of an exported grid from its route matrix
    Densify {
        /// Grid data file; relative paths are resolved against the assets directory
        input_file: std::path::PathBuf,
        /// Overwrite existing dense travel times without asking
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let config = spacetime_core::load_app_config()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build(args) => build::run_build(&config, &args).await,
        Commands::Densify { input_file, force } => {
            densify::run_densify(&config, &input_file, force)
        }
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if is_cancellation(&err) => {
            eprintln!("Aborting: {err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err),
    }
}

/// A declined confirmation ends the run without an error report.
fn is_cancellation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Cancelled>().is_some()
        || matches!(
            err.downcast_ref::<GmapsError>(),
            Some(GmapsError::UserAborted { .. })
        )
}

#[cfg(test)]
mod tests;
