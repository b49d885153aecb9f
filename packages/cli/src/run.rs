//! Query execution shared by the flag-driven and interactive front ends.

use std::path::PathBuf;

use eonet_viewer_event::prepare_for_display;
use eonet_viewer_query::{QueryError, RawFilters};
use eonet_viewer_source::{Session, UpstreamClient};
use eonet_viewer_spatial::search_area_feature;

/// Everything one query run needs besides the session.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Raw filter input.
    pub filters: RawFilters,
    /// Print the search area as a `GeoJSON` feature.
    pub show_bbox: bool,
    /// Write the raw response body here.
    pub export: Option<PathBuf>,
    /// Print processed events as JSON instead of text.
    pub json: bool,
}

/// Builds and runs one query against an established session, printing
/// validation errors, the query URL, and the processed events.
///
/// # Errors
///
/// Returns an error if the session has no location, the events request
/// fails, or the export file cannot be written.
pub async fn run_query(
    client: &UpstreamClient,
    session: &Session,
    options: &QueryOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let location = session
        .location
        .as_ref()
        .ok_or(QueryError::MissingClientLocation)?;
    let built = session.build_query(&options.filters, Session::today())?;

    for error in &built.errors {
        eprintln!("error: {error}");
    }
    println!("Your detected location: {}", location.describe());
    println!("Query URL: {}", built.url);

    if options.show_bbox
        && let Some(bbox) = &built.bbox
    {
        println!("{}", crate::display::format_search_area(bbox));
        println!("{}", serde_json::to_string_pretty(&search_area_feature(bbox))?);
    }

    let fetched = client.events(&built.url).await?;

    if let Some(path) = &options.export {
        std::fs::write(path, serde_json::to_string_pretty(&fetched.raw)?)?;
        println!("Exported raw JSON to {}", path.display());
    }

    if fetched.collection.features.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    let events = prepare_for_display(fetched.collection.features, location.point());
    if options.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        println!();
        print!("{}", crate::display::format_events(&events));
    }

    Ok(())
}
