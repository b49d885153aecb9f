//! GeoJSON-shaped event records from the EONET `events/geojson` endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::GeoPoint;

/// The body of an `events/geojson` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    /// One feature per event geometry. An evolving event (e.g. a storm
    /// track) may appear several times with the same id.
    #[serde(default)]
    pub features: Vec<EventFeature>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// A single event geometry with its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFeature {
    /// Always `"Feature"`.
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    /// Where the event is.
    pub geometry: EventGeometry,
    /// What the event is.
    pub properties: EventProperties,
}

/// Discriminant of an [`EventGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum GeometryKind {
    /// A single position.
    Point,
    /// A track of positions (e.g. a storm path).
    LineString,
    /// An area outline.
    Polygon,
    /// Any geometry type this viewer does not handle.
    Unsupported,
}

/// Event geometry. Coordinates are `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventGeometry {
    /// A single position.
    Point {
        /// `[lon, lat]`.
        coordinates: [f64; 2],
    },
    /// A track of positions.
    LineString {
        /// `[[lon, lat], ...]`.
        coordinates: Vec<[f64; 2]>,
    },
    /// An area outline; the first ring is the exterior.
    Polygon {
        /// `[[[lon, lat], ...], ...]`.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    /// A geometry type not listed above.
    #[serde(other)]
    Unsupported,
}

impl EventGeometry {
    /// Returns the geometry discriminant.
    #[must_use]
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::Point { .. } => GeometryKind::Point,
            Self::LineString { .. } => GeometryKind::LineString,
            Self::Polygon { .. } => GeometryKind::Polygon,
            Self::Unsupported => GeometryKind::Unsupported,
        }
    }

    /// The position of a `Point` geometry.
    #[must_use]
    pub const fn point(&self) -> Option<GeoPoint> {
        match self {
            Self::Point {
                coordinates: [lon, lat],
            } => Some(GeoPoint::new(*lon, *lat)),
            _ => None,
        }
    }

    /// The exterior ring of a `Polygon` without its closing vertex.
    #[must_use]
    pub fn boundary(&self) -> Option<Vec<GeoPoint>> {
        let Self::Polygon { coordinates } = self else {
            return None;
        };
        let ring = coordinates.first()?;
        let open = match ring.split_last() {
            Some((last, rest)) if rest.first() == Some(last) => rest,
            _ => ring.as_slice(),
        };
        Some(open.iter().map(|[lon, lat]| GeoPoint::new(*lon, *lat)).collect())
    }
}

/// A category reference attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCategory {
    /// Category id (e.g. `wildfires`).
    pub id: String,
    /// Display title (e.g. `Wildfires`).
    pub title: String,
}

/// A source reference attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    /// Source id (e.g. `IRWIN`).
    pub id: String,
    /// Link to the record at the source.
    #[serde(default)]
    pub url: Option<String>,
}

/// Event properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProperties {
    /// EONET event id (e.g. `EONET_6543`).
    pub id: String,
    /// Event title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the event's JSON record.
    #[serde(default)]
    pub link: Option<String>,
    /// When the event closed, if it has.
    #[serde(default)]
    pub closed: Option<String>,
    /// ISO 8601 timestamp of this geometry.
    #[serde(default)]
    pub date: Option<String>,
    /// Timestamps of an evolving geometry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry_dates: Vec<String>,
    /// Magnitude value, when the source reports one.
    #[serde(default, deserialize_with = "deserialize_magnitude")]
    pub magnitude_value: Option<f64>,
    /// Unit of [`Self::magnitude_value`].
    #[serde(default)]
    pub magnitude_unit: Option<String>,
    /// Categories this event belongs to.
    #[serde(default)]
    pub categories: Vec<EventCategory>,
    /// Sources that reported this event.
    #[serde(default)]
    pub sources: Vec<EventSource>,
    /// Great-circle distance from the user in kilometres. Only set on
    /// `Point` events, by the post-processor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventProperties {
    /// The timestamp used to order events: `date`, or the latest entry of
    /// `geometryDates` when `date` is absent.
    #[must_use]
    pub fn sort_date(&self) -> Option<&str> {
        self.date
            .as_deref()
            .or_else(|| self.geometry_dates.iter().map(String::as_str).max())
    }

    /// Title of the first category, if any.
    #[must_use]
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(|c| c.title.as_str())
    }
}

/// Accepts a number, a numeric string, `null`, or the string `"null"`.
fn deserialize_magnitude<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
