//! HTTP retriever against a knowledge-base search endpoint
//!
//! Posts `{query, top_k}` and expects a JSON array of scored chunks. The
//! vector store itself (storage format, embeddings, ingestion) lives behind
//! that endpoint and is out of scope here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::collaborators::Retriever;
use crate::errors::{Result, RouterError};
use crate::types::Chunk;

/// HTTP client for a chunk search endpoint
pub struct HttpSearchClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    content: String,
    #[serde(default)]
    source: String,
    score: f64,
}

impl HttpSearchClient {
    /// Create a new search client for the given endpoint URL
    pub fn new(endpoint: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Retriever for HttpSearchClient {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "top_k": top_k }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let hits: Vec<SearchHit> = response.json().await?;

        Ok(hits
            .into_iter()
            .map(|hit| Chunk {
                content: hit.content,
                source: hit.source,
                score: hit.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpSearchClient::new("http://127.0.0.1:8000/search".to_string());
        assert_eq!(client.endpoint(), "http://127.0.0.1:8000/search");
    }

    #[test]
    fn test_hit_deserialization_defaults_source() {
        let hits: Vec<SearchHit> =
            serde_json::from_str(r#"[{"content": "text", "score": 0.8}]"#).unwrap();
        assert_eq!(hits[0].source, "");
        assert_eq!(hits[0].score, 0.8);
    }
}
