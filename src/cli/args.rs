//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, reassign::ReassignArgs, sync_locations::SyncLocationsArgs,
};

#[derive(Parser)]
#[command(name = "prt")]
#[command(author, version, about = "Project Records Toolkit")]
#[command(
    long_about = "A toolkit for reconciling and editing project records hosted on a FileMaker server, fed by the archives database or by operator input."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (default: ./prt.yaml, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactively reassign a project's project manager
    Reassign(ReassignArgs),

    /// Push file-server locations from the archives database into FileMaker
    SyncLocations(SyncLocationsArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}
