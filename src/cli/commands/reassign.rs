//! `prt reassign` - interactive project manager reassignment
//!
//! Walks the operator through picking a project, shows the current
//! manager, offers the managers seen across the most recent projects, and
//! applies the change together with an audit note prepended to the
//! project's notes. Ctrl-C exits cleanly at any prompt.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::cli::commands::utils::{init_tracing, or_abort, project_table};
use crate::cli::GlobalOpts;
use crate::core::api::RecordApi;
use crate::core::audit;
use crate::core::client::RecordClient;
use crate::core::config::{Config, Credentials};
use crate::core::fm::FmDataApi;
use crate::entities::person::{self, PersonRecord};
use crate::entities::project::{self, ProjectRecord};

#[derive(clap::Args, Debug)]
pub struct ReassignArgs {
    /// Project number to change (prompted for when omitted)
    #[arg(long)]
    pub number: Option<String>,

    /// How many recent projects to scan for candidate managers
    #[arg(long)]
    pub lookback: Option<u32>,
}

pub fn run(args: ReassignArgs, global: &GlobalOpts) -> Result<()> {
    init_tracing(if global.verbose { "debug" } else { "warn" }, None)?;

    let config = Config::load(global.config.as_deref()).into_diagnostic()?;
    config.require_server_url().into_diagnostic()?;
    let credentials = Credentials::filemaker_from_env().into_diagnostic()?;
    let lookback = args.lookback.unwrap_or(config.lookback);

    if !global.quiet {
        println!(
            "{}",
            style(format!(
                "Reassign a project's manager to one of the PMs used in the last {lookback} projects. Ctrl-C exits at any time."
            ))
            .blue()
            .bold()
        );
    }

    let api = FmDataApi::new(&config.server).into_diagnostic()?;
    let mut client = RecordClient::connect(
        api,
        credentials,
        config.server.layouts(),
        &config.server.url,
        config.attempts,
    )
    .into_diagnostic()?;

    let target = elicit_project(&mut client, args.number)?;

    println!(
        "{}",
        style(format!(
            "Changing project manager for project: {}, {}",
            target.number.trim(),
            target.name
        ))
        .blue()
    );

    let previous_manager = current_manager(&mut client, &target)?;
    let previous_name = previous_manager.as_ref().map(|p| p.display_name());
    match &previous_name {
        Some(name) => println!("{}", style(format!("Current project manager: {name}")).blue()),
        None => println!(
            "{}",
            style(format!(
                "No previous project manager on record for {}.",
                target.number.trim()
            ))
            .blue()
        ),
    }
    println!();

    let new_manager = elicit_new_manager(&mut client, lookback)?;

    let note = audit::build_note(
        previous_name.as_deref(),
        &new_manager.display_name(),
        chrono::Local::now().naive_local(),
    );
    let notes = audit::prepend_note(target.notes.as_deref(), &note);

    let mut changes = Map::new();
    changes.insert(project::fields::NOTES.to_string(), Value::String(notes));
    changes.insert(
        project::fields::MANAGER_ID.to_string(),
        Value::String(new_manager.id.to_string()),
    );

    let applied = client
        .edit_project(&target.handle, &changes)
        .into_diagnostic()?;
    if !applied {
        return Err(miette::miette!(
            "the project record disappeared while editing; no change was applied"
        ));
    }

    println!();
    println!("{} {}", style("✓").green(), style(&note).green().bold());
    Ok(())
}

/// Prompt (or use the provided number) until exactly one project is
/// pinned down, asking the operator to pick from a table when the number
/// is ambiguous. The selection is re-fetched by internal key so the edit
/// targets a fresh record handle.
fn elicit_project<A: RecordApi>(
    client: &mut RecordClient<A>,
    initial: Option<String>,
) -> Result<ProjectRecord> {
    let theme = ColorfulTheme::default();
    let mut pending = initial;

    let candidates = loop {
        let number = match pending.take() {
            Some(number) => number,
            None => or_abort(
                Input::<String>::with_theme(&theme)
                    .with_prompt("Project number to change")
                    .interact_text(),
            )?,
        };
        let number = number.trim().to_string();
        if number.is_empty() {
            continue;
        }

        let found = client
            .find_projects_by_number(&number)
            .into_diagnostic()?;
        if found.is_empty() {
            println!(
                "{}",
                style(format!(
                    "No projects found with the project number {number}. Please enter a valid project number."
                ))
                .red()
                .bold()
            );
            continue;
        }
        break found;
    };

    let chosen_id = if candidates.len() > 1 {
        println!(
            "{}",
            style("Multiple projects match that number. Choose one from this table.")
                .blue()
                .bold()
        );
        println!("{}", project_table(&candidates));
        let row_count = candidates.len();
        let index = or_abort(
            Input::<usize>::with_theme(&theme)
                .with_prompt("Index of the project to change")
                .validate_with(move |input: &usize| {
                    if *input < row_count {
                        Ok(())
                    } else {
                        Err("enter a row index from the table")
                    }
                })
                .interact_text(),
        )?;
        candidates[index].id
    } else {
        candidates[0].id
    };

    let confirmed = client.find_projects_by_id(chosen_id).into_diagnostic()?;
    confirmed.into_iter().next().ok_or_else(|| {
        miette::miette!("project id {chosen_id} could not be re-fetched; try again")
    })
}

/// Dereference the project's manager field to a person, if one is set.
fn current_manager<A: RecordApi>(
    client: &mut RecordClient<A>,
    target: &ProjectRecord,
) -> Result<Option<PersonRecord>> {
    let Some(manager_id) = target.manager_id else {
        return Ok(None);
    };
    let people = person::collapse_active(
        client
            .find_people_by_ids(&[manager_id])
            .into_diagnostic()?,
    );
    Ok(people.into_iter().next())
}

/// Gather the distinct managers of the most recent projects, collapse
/// historical duplicates, and let the operator pick one.
fn elicit_new_manager<A: RecordApi>(
    client: &mut RecordClient<A>,
    lookback: u32,
) -> Result<PersonRecord> {
    let recent = client.recent_projects(lookback).into_diagnostic()?;

    let mut seen = HashSet::new();
    let mut manager_ids = Vec::new();
    for project in &recent {
        if let Some(id) = project.manager_id {
            if seen.insert(id) {
                manager_ids.push(id);
            }
        }
    }

    let mut people = person::collapse_active(
        client
            .find_people_by_ids(&manager_ids)
            .into_diagnostic()?,
    );
    if people.is_empty() {
        return Err(miette::miette!(
            "no candidate managers found in the last {lookback} projects"
        ));
    }
    people.sort_by_key(|person| person.sort_name());

    let labels: Vec<String> = people
        .iter()
        .map(|person| format!("{} ({})", person.sort_name(), person.id))
        .collect();
    let index = or_abort(
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt("New project manager")
            .items(&labels)
            .default(0)
            .interact(),
    )?;

    Ok(people.remove(index))
}
