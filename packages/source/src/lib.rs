#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream access for the EONET viewer.
//!
//! Wraps the two JSON-over-HTTP services the viewer depends on:
//!
//! 1. **ipapi.co** resolves the user's IP address to a location.
//! 2. **NASA EONET v3** serves the reference catalogs (sources,
//!    categories, magnitude scales) and the event feed.
//!
//! Endpoints are configured by TOML files under `services/` (see
//! [`services`]). Every request goes through [`retry::send_json`] and every
//! successful body is memoized in a [`cache::ResponseCache`] for the rest
//! of the session.

pub mod cache;
pub mod client;
pub mod ipapi;
pub mod retry;
pub mod services;
pub mod session;

pub use client::{FetchedEvents, UpstreamClient};
pub use session::Session;

/// Errors that can occur while talking to an upstream service.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}{}", message_suffix(.message.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
        /// Error message from the response body, when present.
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },

    /// A service configuration is missing or malformed.
    #[error("Service configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

fn message_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_upstream_message() {
        let err = SourceError::Status {
            status: 400,
            url: "https://eonet.gsfc.nasa.gov/api/v3/events/geojson?limit=0".to_string(),
            message: Some("Invalid limit".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "https://eonet.gsfc.nasa.gov/api/v3/events/geojson?limit=0 \
             returned HTTP 400: Invalid limit"
        );

        let err = SourceError::Status {
            status: 503,
            url: "https://ipapi.co/json".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "https://ipapi.co/json returned HTTP 503");
    }
}
