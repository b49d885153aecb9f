//! Plain-text rendering of events and catalogs.

use std::fmt::Write as _;

use eonet_viewer_event_models::{BoundingBox, CatalogKind, EventFeature, ReferenceCatalog};
use eonet_viewer_query::sanitize::format_bbox;

const SEPARATOR: &str = "---";

/// Renders one event as a block of lines.
///
/// Points show their location and distance from the user; polygons list
/// their boundary points. Other geometries show only the common fields.
#[must_use]
pub fn format_event(event: &EventFeature) -> String {
    let properties = &event.properties;
    let mut out = String::new();

    writeln!(out, "{}", properties.title).unwrap();
    writeln!(
        out,
        "Category: {}",
        properties.primary_category().unwrap_or("Uncategorized")
    )
    .unwrap();
    writeln!(out, "Date: {}", properties.sort_date().unwrap_or("Unknown")).unwrap();

    if let Some(point) = event.geometry.point() {
        writeln!(out, "Location: {}, {}", point.latitude, point.longitude).unwrap();
        if let Some(distance) = properties.distance {
            writeln!(out, "Distance from user: {}km", round2(distance)).unwrap();
        }
    } else if let Some(boundary) = event.geometry.boundary() {
        writeln!(out, "Boundary points:").unwrap();
        for point in boundary {
            writeln!(out, "- {}, {}", point.latitude, point.longitude).unwrap();
        }
    }

    if let Some(value) = properties.magnitude_value {
        writeln!(
            out,
            "Magnitude: {value} {}",
            properties.magnitude_unit.as_deref().unwrap_or_default()
        )
        .unwrap();
    }
    if let Some(link) = &properties.link {
        writeln!(out, "Raw JSON: {link}").unwrap();
    }

    out
}

/// Renders the event list, most recent first, separated by rules.
#[must_use]
pub fn format_events(events: &[EventFeature]) -> String {
    let mut out = String::new();
    writeln!(out, "EONET Events ({})", events.len()).unwrap();
    writeln!(out, "Sorted by most recent date.").unwrap();
    writeln!(out, "{SEPARATOR}").unwrap();
    for event in events {
        out.push_str(&format_event(event));
        writeln!(out, "{SEPARATOR}").unwrap();
    }
    out
}

/// Renders a reference catalog as an `ID  TITLE` table.
#[must_use]
pub fn format_catalog(kind: CatalogKind, catalog: &ReferenceCatalog) -> String {
    let width = catalog.ids().map(str::len).max().unwrap_or(0).max(2);
    let mut out = String::new();
    writeln!(out, "{:<width$}  {}", "ID", kind.as_ref().to_uppercase()).unwrap();
    writeln!(out, "{}", "-".repeat(width + 2 + 40)).unwrap();
    for (id, entry) in catalog.iter() {
        writeln!(out, "{id:<width$}  {}", entry.display_name(id)).unwrap();
    }
    out
}

/// One-line summary of the search area in `bbox` wire order.
#[must_use]
pub fn format_search_area(bbox: &BoundingBox) -> String {
    if bbox.crosses_antimeridian() {
        format!("Search area: {} (crosses the antimeridian)", format_bbox(bbox))
    } else {
        format!("Search area: {}", format_bbox(bbox))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
