//! Shared utilities for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tabled::{builder::Builder, settings::Style};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::entities::project::ProjectRecord;

/// Install the tracing subscriber: stderr always, plus an optional plain
/// log file. `RUST_LOG` overrides the default filter.
pub fn init_tracing(default_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    match log_file {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
        }
    }
    Ok(())
}

/// Unwrap a prompt result, treating operator interrupt (Ctrl-C) as an
/// immediate clean exit: no further remote calls, no rollback of edits
/// already applied.
pub fn or_abort<T>(result: dialoguer::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => {
            eprintln!("\n{}", style("Exiting.").red().bold());
            std::process::exit(130);
        }
        Err(err) => Err(miette::miette!("prompt failed: {err}")),
    }
}

/// Render candidate projects as an indexed table for manual selection.
pub fn project_table(projects: &[ProjectRecord]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Index", "Number", "Name"]);
    for (index, project) in projects.iter().enumerate() {
        builder.push_record([
            index.to_string(),
            project.number.trim().to_string(),
            project.name.clone(),
        ]);
    }
    builder.build().with(Style::modern()).to_string()
}
