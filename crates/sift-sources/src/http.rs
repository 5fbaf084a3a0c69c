//! Shared HTTP response helpers for source clients.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`SourceError::Api`]) so individual source
//! modules stay focused on request construction and response mapping.

use crate::error::SourceError;

/// Largest response body echoed back in an [`SourceError::Api`] message.
const MAX_ERROR_BODY: usize = 512;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`SourceError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`SourceError::Api`] with status code and
///   (truncated) response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(SourceError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let message = truncate_error_body(resp.text().await.unwrap_or_default());
        return Err(SourceError::Api { status, message });
    }
    Ok(resp)
}

/// Cut an error body down to at most 512 bytes on a char boundary.
#[must_use]
pub fn truncate_error_body(mut message: String) -> String {
    if message.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| message.is_char_boundary(i))
            .unwrap_or(0);
        message.truncate(cut);
    }
    message
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
