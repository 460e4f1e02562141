//! Error taxonomy for subscription conversion.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that abort a conversion request.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// No remote document location was given.
    #[error("Missing 'remote_url' query parameter.")]
    MissingRemoteUrl,

    /// The remote location is not a usable http(s) URL.
    #[error("Invalid remote_url '{url}': {reason}")]
    InvalidRemoteUrl { url: String, reason: String },

    /// Pairs were supplied but none of them is well-formed.
    #[error("None of the {0} supplied pair entries is well-formed (expected 'landing:front')")]
    MalformedPairs(usize),

    /// The upstream did not answer within the fetch timeout.
    #[error("Request to remote_url timed out after {0} seconds")]
    Timeout(u64),

    /// Network-level failure talking to the upstream.
    #[error("Error fetching remote_url: {0}")]
    Fetch(String),

    /// The upstream answered with a non-success status.
    #[error("Remote server returned HTTP {0}")]
    UpstreamStatus(u16),

    /// The upstream body exceeded the configured limit.
    #[error("Remote document exceeds the {0} byte limit")]
    TooLarge(usize),

    /// The fetched body is not a usable subscription document.
    #[error("Invalid YAML from remote: {0}")]
    InvalidDocument(String),

    /// The rewritten document could not be serialized.
    #[error("Failed to encode subscription: {0}")]
    Encode(String),

    /// Pairs were supplied but none could be applied.
    #[error("{0}")]
    ApplyFailed(String),

    /// The outbound HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl SubscriptionError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            SubscriptionError::MissingRemoteUrl
            | SubscriptionError::InvalidRemoteUrl { .. }
            | SubscriptionError::MalformedPairs(_)
            | SubscriptionError::InvalidDocument(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            SubscriptionError::Fetch(_)
            | SubscriptionError::UpstreamStatus(_)
            | SubscriptionError::TooLarge(_) => StatusCode::BAD_GATEWAY,
            SubscriptionError::ApplyFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubscriptionError::Encode(_) | SubscriptionError::Client(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for failures caused by the upstream rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Timeout(_)
                | SubscriptionError::Fetch(_)
                | SubscriptionError::UpstreamStatus(_)
                | SubscriptionError::TooLarge(_)
        )
    }
}

/// Result type for subscription operations.
pub type SubscriptionResult<T> = Result<T, SubscriptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(SubscriptionError::MissingRemoteUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(SubscriptionError::MalformedPairs(2).status(), StatusCode::BAD_REQUEST);
        assert_eq!(SubscriptionError::Timeout(15).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(SubscriptionError::UpstreamStatus(404).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            SubscriptionError::ApplyFailed("none matched".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert!(SubscriptionError::Fetch("refused".into()).is_upstream());
        assert!(!SubscriptionError::InvalidDocument("x".into()).is_upstream());
    }

    #[test]
    fn test_error_display() {
        let err = SubscriptionError::Timeout(15);
        assert_eq!(err.to_string(), "Request to remote_url timed out after 15 seconds");

        let err = SubscriptionError::InvalidRemoteUrl {
            url: "ftp://x".into(),
            reason: "unsupported scheme".into(),
        };
        assert!(err.to_string().contains("ftp://x"));
    }
}
