//! Grist client error types.

use thiserror::Error;

/// Error that can occur while talking to the Grist API.
#[derive(Debug, Error)]
pub enum GristClientError {
    /// Client construction or configuration problem.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API key was rejected (HTTP 401).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The key is valid but lacks access to the resource (HTTP 403).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The document, table or endpoint does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The API throttled the request (HTTP 429).
    #[error("rate limited{}", retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status.
    #[error("API error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    /// The response body was not the expected JSON shape.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl GristClientError {
    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// The client never retries internally; this only informs callers.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            GristClientError::Http(e) => e.is_timeout() || e.is_connect(),
            GristClientError::RateLimited { .. } => true,
            GristClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for Grist client operations.
pub type GristClientResult<T> = Result<T, GristClientError>;
