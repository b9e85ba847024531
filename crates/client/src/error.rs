//! Error taxonomy for calls made through [`ApiClient`](crate::ApiClient).
//!
//! The transport classifies every failed exchange into exactly one
//! [`ApiError`] variant. Resource modules return it unchanged; callers
//! decide whether to display, retry or re-authenticate.

use reqwest::StatusCode;

use crate::session::SessionError;

/// Client-side error for a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the credentials (HTTP 401). The session has
    /// already been cleared when this is returned.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other 4xx, e.g. a duplicate project key or a rejected body.
    #[error("Validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    /// The server failed to handle the request (HTTP 5xx).
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// No response was received (connection refused, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The base URL or request path does not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The exchange succeeded but updating the local session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Convenience alias for resource-module return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND.as_u16()),
            ApiError::Validation { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(_)
            | ApiError::Decode(_)
            | ApiError::InvalidUrl(_)
            | ApiError::Session(_) => None,
        }
    }

    /// Whether this error ended the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Classify a non-2xx response from its status and raw body.
    ///
    /// - 401 maps to [`ApiError::Unauthorized`].
    /// - 404 maps to [`ApiError::NotFound`].
    /// - 5xx maps to [`ApiError::Server`].
    /// - Every other status maps to [`ApiError::Validation`].
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = error_message(status, body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
            StatusCode::NOT_FOUND => ApiError::NotFound { message },
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Validation {
                status: s.as_u16(),
                message,
            },
        }
    }
}

/// Extract a human-readable message from an error body.
///
/// The backend reports failures as `{"detail": "..."}`; request-validation
/// failures carry a list of `{"loc": [...], "msg": "..."}` items in
/// `detail` instead. An `{"error": "..."}` body is also understood. Anything
/// else falls back to a generic message naming the status.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();

    let detail = parsed.as_ref().and_then(|json| match json.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => json
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string),
    });

    detail.unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}
