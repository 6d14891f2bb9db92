//! Errors shared by the external source clients

use thiserror::Error;

/// Longest response body excerpt kept in errors and logs
pub const BODY_EXCERPT_LEN: usize = 250;

/// One source call failed for one asset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Transport failure or timeout; no HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Credential expired; the rest of the batch must not proceed
    #[error("Authentication expired (HTTP {status})")]
    AuthExpired { status: u16 },

    /// Non-success HTTP status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body could not be understood
    #[error("Parse error (HTTP {status}): {message}")]
    Parse { status: u16, message: String },
}

impl SourceError {
    /// HTTP status when the call got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Network(_) => None,
            SourceError::AuthExpired { status }
            | SourceError::Api { status, .. }
            | SourceError::Parse { status, .. } => Some(*status),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, SourceError::AuthExpired { .. })
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Network(format!("timeout: {}", e))
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

/// Successful source reply with its HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub status: u16,
    pub value: T,
}

/// First `BODY_EXCERPT_LEN` characters of a response body
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        assert_eq!(SourceError::Network("x".into()).status(), None);
        assert_eq!(SourceError::AuthExpired { status: 403 }.status(), Some(403));
        assert_eq!(
            SourceError::Api {
                status: 500,
                body: String::new()
            }
            .status(),
            Some(500)
        );
    }

    #[test]
    fn test_excerpt_is_char_safe() {
        let body = "é".repeat(400);
        assert_eq!(excerpt(&body).chars().count(), BODY_EXCERPT_LEN);
    }
}
