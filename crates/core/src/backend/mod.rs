//! # Generation Backends
//!
//! Uniform `generate(prompt) -> text` over the two interchangeable
//! text-generation services.
//!
//! ```text
//! ModelConfig::from_env() ──▶ create_backend() ──▶ Arc<dyn GenerationBackend>
//!                                                   ├── OllamaBackend (local)
//!                                                   └── GeminiBackend (remote)
//! ```
//!
//! Exactly one backend is active per process. No retries happen here.

pub mod gemini;
pub mod ollama;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::BackendKind;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

/// A text-generation service.
///
/// Callers must not branch on which implementation is active.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Which side of the local/remote split this backend sits on.
    fn kind(&self) -> BackendKind;

    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Cheap readiness probe run once while the team is assembled.
    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Reject base URLs that cannot possibly work.
pub(crate) fn validate_base_url(provider: &str, base_url: &str) -> Result<(), BackendError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(BackendError::config(format!(
            "{}: base URL is empty",
            provider
        )));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(BackendError::config(format!(
            "{}: base URL must start with http:// or https:// (got {})",
            provider, trimmed
        )));
    }
    Ok(())
}
