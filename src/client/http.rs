//! Header construction and HTTP status classification.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{KulturarvError, Result};

const DEFAULT_AUTH_MESSAGE: &str = "Invalid access token. Please check your token and try again.";
const DEFAULT_RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait before sending more messages.";
const DEFAULT_FAILURE_MESSAGE: &str = "Failed to send message";

/// Headers for an authenticated JSON request.
///
/// Rejects empty tokens and tokens that cannot appear in a header.
pub fn bearer_headers(token: &str) -> Result<HeaderMap> {
    let token = token.trim();
    if token.is_empty() {
        return Err(KulturarvError::InvalidArgument(
            "access token must not be empty".into(),
        ));
    }

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        KulturarvError::InvalidArgument("access token contains invalid characters".into())
    })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

/// [`bearer_headers`] plus `Accept: text/event-stream`.
pub fn sse_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = bearer_headers(token)?;
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    Ok(headers)
}

/// Classify a non-success response.
///
/// 401 always yields the fixed credential message, whatever the body says.
/// 429 prefers the body's `message`; other statuses prefer its `error`.
pub fn status_to_error(status: u16, body: &str) -> KulturarvError {
    match status {
        401 => KulturarvError::Authentication(DEFAULT_AUTH_MESSAGE.to_string()),
        429 => KulturarvError::RateLimited {
            message: body_field(body, "message")
                .unwrap_or_else(|| DEFAULT_RATE_LIMIT_MESSAGE.to_string()),
        },
        _ => KulturarvError::api(
            status,
            body_field(body, "error")
                .or_else(|| body_field(body, "message"))
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        ),
    }
}

fn body_field(body: &str, field: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get(field)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}
