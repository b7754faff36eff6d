//! Local generation through an Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{join_url, validate_base_url, GenerationBackend};
use crate::error::BackendError;
use crate::models::BackendKind;

pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.into();
        validate_base_url("ollama", &base_url)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim().to_string(),
            model: model.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = join_url(&self.base_url, "/api/generate");
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::unavailable(format!(
                "Ollama error {}: {}",
                status.as_u16(),
                body
            )));
        }

        let data: serde_json::Value = response.json().await.map_err(|e| {
            BackendError::unavailable(format!("Failed to decode Ollama response: {}", e))
        })?;

        // Older builds answer under `output`; anything else is passed through verbatim.
        let text = data
            .get("response")
            .and_then(|v| v.as_str())
            .or_else(|| data.get("output").and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| data.to_string());

        Ok(text)
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let url = join_url(&self.base_url, "/api/tags");
        let response = self.client.get(&url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::unavailable(format!(
                "Ollama health check failed with status {}",
                response.status().as_u16()
            )))
        }
    }
}
