//! Trackwise - hierarchy navigation for the Trackwise QA tracker.
//!
//! This library provides the client-side core of the `tw` tool: the fixed
//! client → program → project → usecase → userstory → task → subtask type map,
//! entity-context resolution against the entity service, the view state and
//! navigation session, and responsive layout selection.

pub mod cli;
pub mod commands;
pub mod config;
pub mod layout;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod resolver;
#[cfg(feature = "serve")]
pub mod server;
pub mod service;
pub mod tui;

use serde::Serialize;

/// Library-level error type for Trackwise operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed input, rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Session expired or missing credentials. Never retried automatically.
    #[error("Authentication required: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`], as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authentication,
    Network,
    Server,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Error {
    /// Classify this error for display and recovery decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Network(_) => ErrorKind::Network,
            Error::Server(_) => ErrorKind::Server,
            Error::Io(_) | Error::Json(_) | Error::Config(_) | Error::Other(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Whether offering a manual retry makes sense for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Server)
    }
}

/// Result type alias for Trackwise operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(Error::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(Error::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::Authentication("x".into()).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(Error::Network("x".into()).kind(), ErrorKind::Network);
        assert_eq!(Error::Server("x".into()).kind(), ErrorKind::Server);
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(Error::Network("timeout".into()).is_retryable());
        assert!(Error::Server("500".into()).is_retryable());
        assert!(!Error::Authentication("expired".into()).is_retryable());
        assert!(!Error::NotFound("T1".into()).is_retryable());
        assert!(!Error::Validation("empty id".into()).is_retryable());
    }
}
