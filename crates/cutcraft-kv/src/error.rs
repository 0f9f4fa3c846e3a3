//! Record-store error types.

use thiserror::Error;

/// Result type for record-store operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur during record-store operations.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KvError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP status to an error variant.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::AuthError(body),
            404 => Self::NotFound(body),
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, body),
            _ => Self::RequestFailed(body),
        }
    }

    /// Check if the error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KvError::Network(_) | KvError::RateLimited(_) | KvError::ServerError(_, _)
        )
    }

    /// Server-requested retry delay, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            KvError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// HTTP status this error originated from, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            KvError::AuthError(_) => Some(401),
            KvError::NotFound(_) => Some(404),
            KvError::RateLimited(_) => Some(429),
            KvError::ServerError(status, _) => Some(*status),
            _ => None,
        }
    }
}
