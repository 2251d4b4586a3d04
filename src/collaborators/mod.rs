//! Collaborator contracts consumed by the decision engine
//!
//! The engine treats completion and retrieval as external services behind
//! these traits. Default HTTP implementations live in the submodules; tests
//! substitute scripted stubs.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::Chunk;

pub mod ollama;
pub mod search;

pub use ollama::OllamaClient;
pub use search::HttpSearchClient;

/// One-shot text completion against a language model
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a prompt, optionally under a system instruction.
    ///
    /// Fails with a transport or format error on a malformed upstream
    /// response; never partially applies.
    async fn complete(&self, system: Option<&str>, user: &str) -> Result<String>;
}

/// Semantic search against the private knowledge base
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve up to `top_k` scored chunks for a query, ordered by
    /// descending score. Returns an empty vector when nothing matches.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>>;
}
