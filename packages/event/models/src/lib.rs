#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for the EONET viewer.
//!
//! Covers the geographic primitives ([`GeoPoint`], [`BoundingBox`]), the
//! session state resolved once at startup ([`ClientLocation`],
//! [`Catalogs`]), and the GeoJSON-shaped event records returned by the
//! EONET `events/geojson` endpoint ([`FeatureCollection`]).

mod catalog;
mod event;

pub use catalog::{CatalogEntry, CatalogKind, Catalogs, ReferenceCatalog};
pub use event::{
    EventCategory, EventFeature, EventGeometry, EventProperties, EventSource, FeatureCollection,
    GeometryKind,
};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 coordinate pair.
///
/// Computed longitudes are kept in `(-180, 180]`; latitudes are clamped to
/// `[-90, 90]`, never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a point from a longitude and latitude (in that order, matching
    /// `GeoJSON` coordinate order).
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// A lon/lat rectangle in the wire order EONET expects:
/// `min_lon, max_lat, max_lon, min_lat`.
///
/// The box may straddle the antimeridian, in which case `min_lon` is
/// numerically greater than `max_lon`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub min_lon: f64,
    /// Northern latitude boundary.
    pub max_lat: f64,
    /// Eastern longitude boundary.
    pub max_lon: f64,
    /// Southern latitude boundary.
    pub min_lat: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its four edges in wire order.
    #[must_use]
    pub const fn new(min_lon: f64, max_lat: f64, max_lon: f64, min_lat: f64) -> Self {
        Self {
            min_lon,
            max_lat,
            max_lon,
            min_lat,
        }
    }

    /// Returns the four edges in wire order.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.max_lat, self.max_lon, self.min_lat]
    }

    /// Whether the box crosses the antimeridian.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }
}

/// Where the user is, as resolved from their IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLocation {
    /// The resolved IP address, if the service echoed it back.
    #[serde(default)]
    pub ip: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Region or state name.
    #[serde(default)]
    pub region: Option<String>,
    /// Country name.
    #[serde(default)]
    pub country_name: Option<String>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl ClientLocation {
    /// The location as a [`GeoPoint`].
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }

    /// Human-readable `city, region, country` with `Unknown` for any part
    /// the service did not return.
    #[must_use]
    pub fn describe(&self) -> String {
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "Unknown".to_string());
        format!(
            "{}, {}, {}",
            part(&self.city),
            part(&self.region),
            part(&self.country_name)
        )
    }
}

/// Lifecycle status filter accepted by the events endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    /// Events that are still ongoing.
    Open,
    /// Events that have ended.
    Closed,
    /// Both open and closed events.
    All,
}

impl EventStatus {
    /// All status values, in the order they are offered to the user.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Open, Self::Closed, Self::All]
    }
}
