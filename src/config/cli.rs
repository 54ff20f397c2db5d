//! Command-line argument definitions for podprobe.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Command-line interface for podprobe.
#[derive(Debug, Parser)]
#[command(name = "podprobe")]
#[command(
    author,
    version,
    about = "Ordered lifecycle integration harness for a container engine"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine socket path or URL.
    #[arg(long, global = true)]
    pub engine_socket: Option<String>,

    /// Image to pull and run, overriding `subjects.image`.
    #[arg(long, global = true)]
    pub image: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean the engine, run the lifecycle scenario, and clean again.
    Run(RunArgs),

    /// Print the ordered scenario steps without contacting the engine.
    Steps,

    /// Remove every container and image.
    Clean,
}

/// Arguments for the `run` subcommand.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Execute every step even after one fails.
    #[arg(long)]
    pub continue_on_failure: bool,
}
