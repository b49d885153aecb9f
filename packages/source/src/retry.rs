//! HTTP retry helper for transient errors.
//!
//! Every upstream request goes through [`send_json`] rather than calling
//! `reqwest::RequestBuilder::send()` directly, so all of them get
//! exponential backoff on timeouts, connection failures, HTTP 429 and
//! HTTP 5xx.
//!
//! ```ignore
//! let body = retry::send_json(|| http.get(&url), 3).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`.
///
/// Retries up to `max_retries` times with backoff of 2s, 4s, 8s, ... on
/// connection errors, timeouts, HTTP 429 and HTTP 5xx. Other 4xx statuses
/// are permanent and returned immediately.
///
/// # Errors
///
/// * [`SourceError::Http`] if the request fails after all retries
/// * [`SourceError::Status`] if the server answers with a non-success
///   status, carrying the body's `message` (or `reason`) field if any
/// * [`SourceError::Json`] if the body is not valid JSON
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    max_retries: u32,
) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries).await?;
    let url = response.url().to_string();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "JSON parse failed.\n  url: {url}\n  received: {} bytes\n  \
             parse error: {e}\n  body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(e)
    })
}

#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {}", response.url());
                        attempt += 1;
                        continue;
                    }
                    return Err(status_error(response).await);
                }

                if status.is_client_error() {
                    return Err(status_error(response).await);
                }

                return Ok(response);
            }
        }
    }
}

/// Builds a [`SourceError::Status`] from a failed response, pulling the
/// upstream error message out of the body when it is JSON.
async fn status_error(response: reqwest::Response) -> SourceError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| error_message(&body));
    SourceError::Status {
        status,
        url,
        message,
    }
}

/// Extracts the human-readable error from an upstream error body.
///
/// EONET puts it in `message`; ipapi uses `reason`.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "reason"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn preview(text: &str) -> String {
    if text.len() > BODY_PREVIEW_LEN {
        let mut end = BODY_PREVIEW_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_reads_eonet_message() {
        let body = r#"{"title": "Bad Request", "message": "Invalid date format"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid date format"));
    }

    #[test]
    fn error_message_reads_ipapi_reason() {
        let body = r#"{"ip": "999.1.1.1", "error": true, "reason": "Invalid IP Address"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid IP Address"));
    }

    #[test]
    fn error_message_ignores_non_json_and_blank() {
        assert_eq!(error_message("<html>502 Bad Gateway</html>"), None);
        assert_eq!(error_message(r#"{"message": "  "}"#), None);
        assert_eq!(error_message(r#"{"message": 42}"#), None);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(BODY_PREVIEW_LEN);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert!(p.len() <= BODY_PREVIEW_LEN + 3);
        assert_eq!(preview("short"), "short");
    }
}
