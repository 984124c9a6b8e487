//! Watcher error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a watch run
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Cursor storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WatchError {
    /// Map an HTTP error status and body onto the matching variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => WatchError::Auth { status, body },
            _ => WatchError::Upstream { status, body },
        }
    }

    /// Errors that will not go away by running again (credential or config problems)
    pub fn is_fatal(&self) -> bool {
        matches!(self, WatchError::Config(_) | WatchError::Auth { .. })
    }

    /// Check if the next scheduled run can reasonably expect a different outcome
    pub fn is_retryable(&self) -> bool {
        match self {
            WatchError::Upstream { status, .. } => *status >= 500 || matches!(status, 408 | 429),
            WatchError::Timeout(_) => true,
            WatchError::Network(_) => true,
            WatchError::Config(_) => false,
            WatchError::Auth { .. } => false,
            WatchError::InvalidResponse(_) => false,
            WatchError::Storage { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_auth() {
        let err = WatchError::from_status(401, "Bad credentials".to_string());
        assert!(matches!(err, WatchError::Auth { status: 401, .. }));

        let err = WatchError::from_status(403, "Forbidden".to_string());
        assert!(matches!(err, WatchError::Auth { status: 403, .. }));
    }

    #[test]
    fn test_from_status_upstream() {
        let err = WatchError::from_status(404, "Not Found".to_string());
        assert!(matches!(err, WatchError::Upstream { status: 404, .. }));

        let err = WatchError::from_status(502, "Bad gateway".to_string());
        assert!(matches!(err, WatchError::Upstream { status: 502, .. }));
    }

    #[test]
    fn test_is_fatal() {
        assert!(WatchError::Config("missing token".to_string()).is_fatal());
        assert!(
            WatchError::Auth {
                status: 401,
                body: String::new()
            }
            .is_fatal()
        );
        assert!(!WatchError::Timeout(Duration::from_secs(30)).is_fatal());
    }

    #[test]
    fn test_is_retryable() {
        // 5xx errors should be retryable
        assert!(
            WatchError::Upstream {
                status: 503,
                body: "Service unavailable".to_string()
            }
            .is_retryable()
        );

        assert!(
            WatchError::Upstream {
                status: 429,
                body: "Too many requests".to_string()
            }
            .is_retryable()
        );

        // Missing branch will still be missing next time
        assert!(
            !WatchError::Upstream {
                status: 404,
                body: "Not Found".to_string()
            }
            .is_retryable()
        );

        assert!(WatchError::Timeout(Duration::from_secs(30)).is_retryable());

        assert!(
            !WatchError::Auth {
                status: 403,
                body: "Forbidden".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_upstream_message_includes_status_and_body() {
        let err = WatchError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");
    }
}
