//! Query rewriter
//!
//! Produces a higher-recall retrieval query variant of the utterance. The
//! rewrite is advisory: any failure, timeout, or empty output makes the
//! engine fall back to the original utterance unmodified, so the rewriter
//! can never block or invalidate the pipeline.

use std::sync::Arc;
use std::time::Duration;

use crate::classifier::strip_code_fences;
use crate::collaborators::CompletionClient;
use crate::errors::{Result, RouterError};

const SYSTEM_PROMPT: &str = "You are a query rewriter for a document search engine. \
Rewrite the user's request as one standalone search query with higher recall. \
Preserve named entities, policy names, and legal references exactly. \
Return only the query text, no quotes, no explanation.";

/// Rewriter over a shared completion collaborator
pub struct QueryRewriter {
    client: Arc<dyn CompletionClient>,
}

impl QueryRewriter {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Rewrite one utterance within the given boundary timeout
    ///
    /// Guarantees a non-empty query on success. Empty output is an error so
    /// the engine's fallback keeps `retrieval_query` non-empty.
    pub async fn rewrite(&self, utterance: &str, limit: Duration) -> Result<String> {
        let call = self.client.complete(Some(SYSTEM_PROMPT), utterance);

        let text = tokio::time::timeout(limit, call)
            .await
            .map_err(|_| RouterError::Timeout {
                duration_ms: limit.as_millis() as u64,
            })??;

        let query = strip_code_fences(&text)
            .trim_matches('"')
            .trim()
            .to_string();

        if query.is_empty() {
            return Err(RouterError::MalformedOutput(
                "rewriter returned empty query".to_string(),
            ));
        }

        Ok(query)
    }
}
