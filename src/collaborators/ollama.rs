//! Ollama completion client
//!
//! Non-streaming POST to `/api/generate`. The engine only needs one
//! complete response per call; classifier and rewriter prompts are short.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::collaborators::CompletionClient;
use crate::errors::{Result, RouterError};

/// HTTP client for the Ollama generate API
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the Ollama API (default: http://127.0.0.1:11434)
    /// * `model` - Model name, e.g. "qwen2.5:7b-instruct"
    pub fn new(base_url: Option<String>, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.unwrap_or_else(|| "http://127.0.0.1:11434".to_string()),
            model,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, system: Option<&str>, user: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let mut body = json!({
            "model": self.model,
            "prompt": user,
            "stream": false,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.response)
    }
}
