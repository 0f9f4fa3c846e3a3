//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error body.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the server rejected the request for exhausted quota.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            ClientError::Api { code: Some(code), .. } if code == "limit_reached"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detection() {
        let err = ClientError::Api {
            status: 403,
            message: "Free plan limit reached.".to_string(),
            code: Some("limit_reached".to_string()),
        };
        assert!(err.is_quota_exceeded());

        let err = ClientError::Api {
            status: 400,
            message: "Invalid plan type".to_string(),
            code: None,
        };
        assert!(!err.is_quota_exceeded());
    }
}
