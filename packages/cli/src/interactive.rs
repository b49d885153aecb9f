//! Interactive query form.
//!
//! Walks the user through every filter with `dialoguer` prompts, runs the
//! query, and offers to run another against the same session.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, MultiSelect, Select};
use eonet_viewer_event_models::{CatalogKind, Catalogs, EventStatus, ReferenceCatalog};
use eonet_viewer_query::RawFilters;
use eonet_viewer_query::builder::{DEFAULT_SCALE, default_date_range};
use eonet_viewer_source::{Session, UpstreamClient};

use crate::run::{QueryOptions, run_query};

/// Runs the interactive form until the user declines another query.
///
/// # Errors
///
/// Returns an error if a prompt fails or the session cannot be started.
pub async fn run(client: &UpstreamClient) -> Result<(), Box<dyn std::error::Error>> {
    println!("EONET Natural Events Viewer");
    println!();

    let ip = prompt_optional("IP address to locate (empty to detect your own)")?;
    let session = Session::start(client, ip.as_deref()).await?;

    loop {
        let options = prompt_query(&session)?;
        if let Err(e) = run_query(client, &session, &options).await {
            eprintln!("error: {e}");
        }

        println!();
        let again = Confirm::new()
            .with_prompt("Run another query?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

fn prompt_query(session: &Session) -> Result<QueryOptions, Box<dyn std::error::Error>> {
    let source = prompt_catalog_ids("Data sources", &session.catalogs, CatalogKind::Sources)?;
    let category = prompt_catalog_ids("Event types", &session.catalogs, CatalogKind::Categories)?;

    let statuses = EventStatus::all();
    let status_labels: Vec<&str> = statuses.iter().map(AsRef::<str>::as_ref).collect();
    let status_idx = Select::new()
        .with_prompt("Event status")
        .items(&status_labels)
        .default(0)
        .interact()?;

    let limit = prompt_optional("Maximum number of events (empty for no limit)")?;

    let (default_start, default_end) = default_date_range(Session::today());
    let start: String = Input::new()
        .with_prompt("Start of date range (YYYY-MM-DD)")
        .default(default_start)
        .interact_text()?;
    let end: String = Input::new()
        .with_prompt("End of date range (YYYY-MM-DD)")
        .default(default_end)
        .interact_text()?;

    let mag_id = prompt_magnitude_id(session.catalogs.get(CatalogKind::Magnitudes))?;
    let (mag_min, mag_max) = if mag_id.is_some() {
        (
            prompt_optional("Minimum magnitude (empty for none)")?,
            prompt_optional("Maximum magnitude (empty for none)")?,
        )
    } else {
        (None, None)
    };

    let scale: String = Input::new()
        .with_prompt("Search area scale (degrees)")
        .default(DEFAULT_SCALE.to_string())
        .interact_text()?;

    let show_bbox = Confirm::new()
        .with_prompt("Delineate search area?")
        .default(false)
        .interact()?;
    let export = prompt_optional("Export raw JSON to file (empty to skip)")?.map(PathBuf::from);

    Ok(QueryOptions {
        filters: RawFilters {
            source,
            category,
            status: Some(status_labels[status_idx].to_string()),
            limit,
            start: Some(start),
            end: Some(end),
            mag_id,
            mag_min,
            mag_max,
            scale: Some(scale),
        },
        show_bbox,
        export,
        json: false,
    })
}

/// Multi-selects entries of the `kind` catalog by display name and returns
/// the chosen ids comma-joined, or `None` when nothing is picked.
fn prompt_catalog_ids(
    prompt: &str,
    catalogs: &Catalogs,
    kind: CatalogKind,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let catalog = catalogs.get(kind);
    let entries: Vec<(&str, &str)> = catalog
        .iter()
        .map(|(id, entry)| (id, entry.display_name(id)))
        .collect();
    let labels: Vec<&str> = entries.iter().map(|(_, label)| *label).collect();

    let selected = MultiSelect::new()
        .with_prompt(format!("{prompt} (space=toggle, enter=confirm, none=all)"))
        .items(&labels)
        .max_length(20)
        .interact()?;

    if selected.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        selected
            .into_iter()
            .map(|i| entries[i].0)
            .collect::<Vec<_>>()
            .join(","),
    ))
}

fn prompt_magnitude_id(
    catalog: &ReferenceCatalog,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut labels = vec!["(no magnitude filter)".to_string()];
    let ids: Vec<&str> = catalog.ids().collect();
    labels.extend(
        catalog
            .iter()
            .map(|(id, entry)| format!("{id}: {}", entry.display_name(id))),
    );

    let idx = Select::new()
        .with_prompt("Magnitude scale")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(idx.checked_sub(1).map(|i| ids[i].to_string()))
}

fn prompt_optional(prompt: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let input = input.trim();
    Ok(if input.is_empty() {
        None
    } else {
        Some(input.to_string())
    })
}
