#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial math for the search area around the user.
//!
//! The search radius ("scale") is expressed in degrees and applied equally
//! to longitude and latitude, matching how the EONET `bbox` filter is
//! usually driven. No correction is made for the shrinking length of a
//! degree of longitude away from the equator, so the box widens towards
//! the poles.

use eonet_viewer_event_models::{BoundingBox, GeoPoint};
use geo::{Coord, LineString};
use geojson::{Feature, Geometry, JsonObject};

/// Mean Earth radius in kilometres used by [`haversine_distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wraps a longitude into `(-180, 180]`.
///
/// Uses a Euclidean remainder so negative inputs wrap the same way positive
/// ones do. The open lower end maps `-180` onto `180`.
#[must_use]
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { 180.0 } else { wrapped }
}

/// Builds the search box of half-width `radius` degrees around `center`.
///
/// Longitudes wrap across the antimeridian; latitudes clamp at the poles.
#[must_use]
pub fn compute_bounding_box(center: GeoPoint, radius: f64) -> BoundingBox {
    BoundingBox {
        min_lon: wrap_longitude(center.longitude - radius),
        max_lat: (center.latitude + radius).min(90.0),
        max_lon: wrap_longitude(center.longitude + radius),
        min_lat: (center.latitude - radius).max(-90.0),
    }
}

/// Returns the closed corner ring of `bbox`: upper-left, upper-right,
/// lower-right, lower-left, upper-left.
#[must_use]
pub const fn bounding_box_corners(bbox: &BoundingBox) -> [GeoPoint; 5] {
    let upper_left = GeoPoint::new(bbox.min_lon, bbox.max_lat);
    let upper_right = GeoPoint::new(bbox.max_lon, bbox.max_lat);
    let lower_right = GeoPoint::new(bbox.max_lon, bbox.min_lat);
    let lower_left = GeoPoint::new(bbox.min_lon, bbox.min_lat);
    [upper_left, upper_right, lower_right, lower_left, upper_left]
}

/// Great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// The search-area outline as a `GeoJSON` feature with a `LineString`
/// geometry, for drawing over a map.
#[must_use]
pub fn search_area_feature(bbox: &BoundingBox) -> Feature {
    let ring: LineString<f64> = bounding_box_corners(bbox)
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), "Search area".into());
    properties.insert(
        "bbox".to_string(),
        serde_json::Value::from(bbox.to_array().to_vec()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&ring))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
