#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query construction for the EONET `events/geojson` endpoint.
//!
//! Raw user input goes through the per-field sanitizers in [`sanitize`],
//! which either contribute a parameter or record a [`FilterError`]. A bad
//! field never aborts the pass: it is left out of the query and reported
//! alongside the URL that [`builder::build_query`] returns.

pub mod builder;
pub mod sanitize;
pub mod validate;

pub use builder::{BuiltQuery, QueryContext, RawFilters, build_query};

use eonet_viewer_event_models::CatalogKind;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Query parameter names understood by the events endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum FilterKey {
    /// Comma-separated source ids.
    Source,
    /// Comma-separated category ids.
    Category,
    /// `open`, `closed`, or `all`.
    Status,
    /// Maximum number of events.
    Limit,
    /// First day of the date range.
    Start,
    /// Last day of the date range.
    End,
    /// Magnitude scale id.
    #[strum(serialize = "magID")]
    MagId,
    /// Lower magnitude bound.
    MagMin,
    /// Upper magnitude bound.
    MagMax,
    /// Search area, `min_lon,max_lat,max_lon,min_lat`.
    Bbox,
}

/// Validated query parameters in insertion order.
///
/// Only keys that passed validation are present; an absent key means the
/// upstream default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParameters {
    entries: Vec<(FilterKey, String)>,
}

impl FilterParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A parameter set holding a single key.
    #[must_use]
    pub fn single(key: FilterKey, value: impl Into<String>) -> Self {
        let mut params = Self::new();
        params.insert(key, value);
        params
    }

    /// Sets `key`, overwriting an earlier value in place.
    pub fn insert(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Merges `other` into `self`; later keys overwrite earlier ones.
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Looks up the value for `key`.
    #[must_use]
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: FilterKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameter passed validation.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Percent-encodes the parameters as `key=value&...`.
    ///
    /// Commas are left literal since list and `bbox` values depend on them.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key.as_ref()), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).replace("%2C", ",")
}

/// A rejected filter value. The `Display` text is meant for the end user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Some list tokens are not in the reference catalog.
    #[error(
        "{kind} input errors: {}; {kind} must be one of: {}",
        .unknown.join(", "),
        .valid.join(", ")
    )]
    UnknownIds {
        /// Which catalog the tokens were checked against.
        kind: CatalogKind,
        /// Tokens that did not match.
        unknown: Vec<String>,
        /// Every accepted id.
        valid: Vec<String>,
    },

    /// Status is not `open`, `closed`, or `all`.
    #[error(
        "Status input error: {0}; status must be open, closed, or all \
         (leaving status blank defaults to open)"
    )]
    InvalidStatus(String),

    /// Limit is not a positive integer.
    #[error("Limit input error: {0}; limit must be a positive integer")]
    InvalidLimit(String),

    /// A date is malformed or the range is reversed.
    #[error(
        "Date range input error: {start} - {end}; each date must be in the YYYY-MM-DD \
         format and the start date must be before or equal to the end date"
    )]
    InvalidDateRange {
        /// Raw start value.
        start: String,
        /// Raw end value.
        end: String,
    },

    /// `magID` is not a known magnitude scale.
    #[error("Magnitude ID input error: {id}; magID must be one of: {}", .valid.join(", "))]
    UnknownMagnitudeId {
        /// Raw value.
        id: String,
        /// Every accepted id.
        valid: Vec<String>,
    },

    /// A magnitude bound is not a non-negative number.
    #[error("{key} input error: {value}; {key} must be a number greater than or equal to 0")]
    InvalidMagnitude {
        /// `magMin` or `magMax`.
        key: FilterKey,
        /// Raw value.
        value: String,
    },

    /// `magMin` is greater than `magMax`.
    #[error(
        "Magnitude range input error: magMin {min} is greater than magMax {max}; \
         neither bound was applied"
    )]
    MagnitudeOrder {
        /// Raw lower bound.
        min: String,
        /// Raw upper bound.
        max: String,
    },

    /// Scale is not a non-negative number.
    #[error(
        "Scale input error: {0}; scale must be a float or integer that is greater than \
         or equal to 0"
    )]
    InvalidScale(String),
}

/// Failures that stop a query from being built at all.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The user's location has not been resolved, so no search area can be
    /// computed.
    #[error("Client location is not available; cannot build a location-based query")]
    MissingClientLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_match_upstream() {
        assert_eq!(FilterKey::Source.as_ref(), "source");
        assert_eq!(FilterKey::MagId.as_ref(), "magID");
        assert_eq!(FilterKey::MagMin.as_ref(), "magMin");
        assert_eq!(FilterKey::MagMax.as_ref(), "magMax");
        assert_eq!(FilterKey::Bbox.as_ref(), "bbox");
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut params = FilterParameters::new();
        params.insert(FilterKey::Status, "open");
        params.insert(FilterKey::Limit, "5");
        params.insert(FilterKey::Status, "all");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get(FilterKey::Status), Some("all"));
        assert_eq!(params.iter().next(), Some((FilterKey::Status, "all")));
    }

    #[test]
    fn query_string_keeps_commas_and_escapes_the_rest() {
        let mut params = FilterParameters::new();
        params.insert(FilterKey::Source, "IRWIN,InciWeb");
        params.insert(FilterKey::Bbox, "-132.4,47.8,-112.4,27.8");
        params.insert(FilterKey::Category, "a b&c");
        assert_eq!(
            params.to_query_string(),
            "source=IRWIN,InciWeb&bbox=-132.4,47.8,-112.4,27.8&category=a%20b%26c"
        );
    }

    #[test]
    fn unknown_ids_message_names_tokens() {
        let err = FilterError::UnknownIds {
            kind: CatalogKind::Sources,
            unknown: vec!["NOTREAL".to_string()],
            valid: vec!["EO".to_string(), "IRWIN".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "sources input errors: NOTREAL; sources must be one of: EO, IRWIN"
        );
    }
}
