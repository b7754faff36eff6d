//! # Collab Models
//!
//! Generation backend selection for the Collab system.
//!
//! The backend is chosen once at start-up from the environment and shared by
//! every role adapter for the lifetime of the process:
//! - `OLLAMA_BASE_URL` set → local Ollama server (`OLLAMA_MODEL`)
//! - otherwise → remote Gemini API (`GEMINI_API_KEY` / `GOOGLE_API_KEY`)

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::{GeminiBackend, GenerationBackend, OllamaBackend};
use crate::error::BackendError;

pub const DEFAULT_OLLAMA_MODEL: &str = "gpt-oss:120b-cloud";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Which generation service is active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Self-hosted service on the local network
    Local,
    /// Hosted API
    #[default]
    Remote,
}

impl BackendKind {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Local => "Ollama",
            BackendKind::Remote => "Gemini",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

/// Configuration for the generation backend
///
/// ## Example
/// ```rust,ignore
/// use collab_core::models::ModelConfig;
///
/// let config = ModelConfig::from_env();
/// let backend = config.create_backend()?;
/// let text = backend.generate("Say hello").await?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// Model name (e.g., "gpt-oss:120b-cloud", "gemini-2.5-flash")
    pub model: String,
    /// Base URL (required for Local, optional override for Remote)
    pub base_url: Option<String>,
    /// API key for the remote service; never serialized
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Per-request transport timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Remote,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: None,
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ModelConfig {
    /// Local Ollama configuration
    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Local,
            model: model.into(),
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Remote Gemini configuration
    pub fn remote(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Remote,
            model: model.into(),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Resolve the backend from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the backend from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout_secs = non_empty("COLLAB_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        if let Some(base_url) = non_empty("OLLAMA_BASE_URL") {
            return Self {
                kind: BackendKind::Local,
                model: non_empty("OLLAMA_MODEL")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                base_url: Some(base_url),
                api_key: None,
                request_timeout_secs,
            };
        }

        Self {
            kind: BackendKind::Remote,
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: non_empty("GEMINI_BASE_URL"),
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY")),
            request_timeout_secs,
        }
    }

    /// Create the generation backend for this configuration
    pub fn create_backend(&self) -> Result<Arc<dyn GenerationBackend>, BackendError> {
        let timeout = Duration::from_secs(self.request_timeout_secs);
        match self.kind {
            BackendKind::Local => {
                let base_url = self.base_url.clone().ok_or_else(|| {
                    BackendError::config("OLLAMA_BASE_URL not set for the local backend")
                })?;
                Ok(Arc::new(OllamaBackend::new(
                    base_url,
                    self.model.clone(),
                    timeout,
                )?))
            }
            BackendKind::Remote => {
                let api_key = self.api_key.clone().unwrap_or_default();
                Ok(Arc::new(GeminiBackend::new(
                    api_key,
                    self.model.clone(),
                    self.base_url.clone(),
                    timeout,
                )?))
            }
        }
    }
}
