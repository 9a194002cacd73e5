use thiserror::Error;

use crate::client::TransportError;

/// Why a single check failed. Rendered into a result's message (the
/// `Display` text) and details; never propagated past the check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("No token available")]
    MissingToken,

    #[error("No credentials configured")]
    UnknownRole(String),

    #[error("Request failed")]
    Transport(#[from] TransportError),

    #[error("HTTP {status}")]
    UnexpectedStatus { status: u16, snippet: String },

    #[error("Expected {expected}, got {status}")]
    AccessNotDenied {
        expected: u16,
        status: u16,
        snippet: String,
    },

    #[error("Missing token or user in response")]
    MissingCredentials { snippet: String },

    #[error("Unexpected response body: {reason}")]
    MalformedBody { reason: String, snippet: String },
}

impl CheckError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn details(&self) -> Option<String> {
        match self {
            CheckError::MissingToken => Some("Login first".to_string()),
            CheckError::UnknownRole(role) => Some(format!("Role '{}' is not configured", role)),
            CheckError::Transport(e) => Some(e.to_string()),
            CheckError::UnexpectedStatus { snippet, .. }
            | CheckError::AccessNotDenied { snippet, .. }
            | CheckError::MissingCredentials { snippet }
            | CheckError::MalformedBody { snippet, .. } => {
                if snippet.is_empty() {
                    None
                } else {
                    Some(snippet.clone())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(CheckError::MissingToken.message(), "No token available");
        assert_eq!(
            CheckError::MissingToken.details().as_deref(),
            Some("Login first")
        );

        let err = CheckError::AccessNotDenied {
            expected: 401,
            status: 200,
            snippet: "[]".into(),
        };
        assert_eq!(err.message(), "Expected 401, got 200");
        assert_eq!(err.details().as_deref(), Some("[]"));

        let err = CheckError::from(TransportError::Timeout(10_000));
        assert_eq!(err.message(), "Request failed");
        assert_eq!(
            err.details().as_deref(),
            Some("request timed out after 10000ms")
        );
    }

    #[test]
    fn test_empty_snippet_has_no_details() {
        let err = CheckError::UnexpectedStatus {
            status: 204,
            snippet: String::new(),
        };
        assert_eq!(err.message(), "HTTP 204");
        assert_eq!(err.details(), None);
    }
}
