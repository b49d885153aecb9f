#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Post-processing of fetched events before display.
//!
//! [`prepare_for_display`] runs the full pipeline in order:
//! [`augment`] → [`dedupe`] → [`exclude_line_strings`] →
//! [`sort_by_date_descending`]. Each step is also usable on its own.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use eonet_viewer_event_models::{EventFeature, GeoPoint, GeometryKind};
use eonet_viewer_spatial::haversine_distance_km;

/// Attaches the great-circle distance from `client` to every `Point` event.
///
/// Other geometries have no single point to measure to and pass through
/// unchanged.
#[must_use]
pub fn augment(mut events: Vec<EventFeature>, client: GeoPoint) -> Vec<EventFeature> {
    for event in &mut events {
        if let Some(point) = event.geometry.point() {
            event.properties.distance = Some(haversine_distance_km(client, point));
        }
    }
    events
}

/// Keeps the first occurrence of each event id, preserving order.
#[must_use]
pub fn dedupe(events: Vec<EventFeature>) -> Vec<EventFeature> {
    let before = events.len();
    let mut seen = BTreeSet::new();
    let kept: Vec<EventFeature> = events
        .into_iter()
        .filter(|event| seen.insert(event.properties.id.clone()))
        .collect();
    if kept.len() < before {
        log::debug!("Dropped {} duplicate event(s)", before - kept.len());
    }
    kept
}

/// Drops `LineString` events (tracks such as storm paths) from the list.
#[must_use]
pub fn exclude_line_strings(events: Vec<EventFeature>) -> Vec<EventFeature> {
    events
        .into_iter()
        .filter(|event| event.geometry.kind() != GeometryKind::LineString)
        .collect()
}

/// Stable sort, most recent first. Events without a date go last.
///
/// Dates are ISO 8601 strings, so string order is chronological order.
#[must_use]
pub fn sort_by_date_descending(mut events: Vec<EventFeature>) -> Vec<EventFeature> {
    events.sort_by(|a, b| match (a.properties.sort_date(), b.properties.sort_date()) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    events
}

/// Runs the whole display pipeline over a fetched feature list.
#[must_use]
pub fn prepare_for_display(events: Vec<EventFeature>, client: GeoPoint) -> Vec<EventFeature> {
    let fetched = events.len();
    let events = sort_by_date_descending(exclude_line_strings(dedupe(augment(events, client))));
    log::info!("Prepared {} of {fetched} fetched event(s) for display", events.len());
    events
}
