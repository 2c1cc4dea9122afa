//! Shared HTTP response helpers for the GitHub client.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`RegistryError::Api`]) so the endpoint methods
//! stay focused on request construction and response mapping.

use crate::error::RegistryError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`RegistryError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`RegistryError::Api`] with the status code and
///   GitHub's `message` field, or the raw body when it is not JSON.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(RegistryError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(RegistryError::Api {
            status,
            message: github_message(&body),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[derive(serde::Deserialize)]
struct GitHubErrorBody {
    message: String,
}

fn github_message(body: &str) -> String {
    serde_json::from_str::<GitHubErrorBody>(body).map_or_else(|_| body.trim().to_string(), |b| b.message)
}
