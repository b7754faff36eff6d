//! # Errors
//!
//! Typed error kinds for the generation and search layers.
//! Persistence and application plumbing use `anyhow`.

use thiserror::Error;

/// Failure of the active generation backend.
///
/// Both kinds are fatal for the call that produced them. A role adapter
/// re-raises them unchanged and the coordinator turns them into
/// "stage absent" without aborting the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Backend unreachable, rejected the request, or answered with garbage.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Required credentials or endpoints are missing.
    #[error("backend configuration error: {0}")]
    Config(String),
}

impl BackendError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Short code for logs and events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "backend_unavailable",
            Self::Config(_) => "backend_config_error",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Failure of a search provider. Never escapes the Researcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search unavailable: {0}")]
    Unavailable(String),
}
