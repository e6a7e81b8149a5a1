//! `prt sync-locations` - batch location reconciliation
//!
//! Reads every project with a recorded file-server location out of the
//! archives database and pushes the re-rooted path into the matching
//! FileMaker record, one row at a time. Finishes with the outcome tally
//! and the list of project numbers actually modified.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::init_tracing;
use crate::cli::GlobalOpts;
use crate::core::client::RecordClient;
use crate::core::config::{Config, Credentials};
use crate::core::fm::FmDataApi;
use crate::core::reconcile::Reconciler;
use crate::core::source::ArchiveSource;

#[derive(clap::Args, Debug)]
pub struct SyncLocationsArgs {
    /// Also write the run log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub fn run(args: SyncLocationsArgs, global: &GlobalOpts) -> Result<()> {
    init_tracing(
        if global.verbose { "debug" } else { "info" },
        args.log_file.as_deref(),
    )?;

    let config = Config::load(global.config.as_deref()).into_diagnostic()?;
    config.require_server_url().into_diagnostic()?;
    config.require_archives_host().into_diagnostic()?;
    let fm_credentials = Credentials::filemaker_from_env().into_diagnostic()?;
    let archives_credentials = Credentials::archives_from_env().into_diagnostic()?;

    let mut source =
        ArchiveSource::connect(&config.archives, &archives_credentials).into_diagnostic()?;
    let rows = source.project_locations().into_diagnostic()?;
    tracing::info!(rows = rows.len(), "retrieved project locations from archives");

    let api = FmDataApi::new(&config.server).into_diagnostic()?;
    let client = RecordClient::connect(
        api,
        fm_credentials,
        config.server.layouts(),
        &config.server.url,
        config.attempts,
    )
    .into_diagnostic()?;

    let mut engine = Reconciler::new(client, config.mount_prefix.clone());
    let tally = engine.run(&rows);

    tracing::info!("update process completed; status summary:\n{tally}");
    if !tally.modified.is_empty() {
        tracing::info!("modified projects: {}", tally.modified.join(", "));
    }

    if !global.quiet {
        println!("{} Location sync finished.", style("✓").green());
        println!("{tally}");
        if !tally.modified.is_empty() {
            println!("Modified projects: {}", tally.modified.join(", "));
        }
    }
    Ok(())
}
