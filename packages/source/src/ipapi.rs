//! ipapi.co response handling.

use eonet_viewer_event_models::ClientLocation;

/// Turns an ipapi response body into a location.
///
/// ipapi answers some failures with HTTP 200 and `{"error": true, ...}`;
/// those, and bodies without usable coordinates, yield `None`.
#[must_use]
pub fn parse_ip_data(body: &serde_json::Value) -> Option<ClientLocation> {
    if body.get("error").and_then(serde_json::Value::as_bool) == Some(true) {
        log::warn!(
            "IP lookup failed: {}",
            body.get("reason")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("no reason given")
        );
        return None;
    }

    match serde_json::from_value::<ClientLocation>(body.clone()) {
        Ok(location) if location.latitude.is_finite() && location.longitude.is_finite() => {
            Some(location)
        }
        Ok(_) => {
            log::warn!("IP lookup returned non-finite coordinates");
            None
        }
        Err(e) => {
            log::warn!("IP lookup returned no usable location: {e}");
            None
        }
    }
}
