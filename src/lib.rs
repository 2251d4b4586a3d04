//! intentgate - routing decision engine for natural-language requests
//!
//! Routes each utterance to one of three downstream paths: general
//! conversational completion (`chat`), retrieval-grounded question
//! answering (`retrieval`), or structured configuration generation
//! (`config`).
//!
//! # Architecture
//!
//! - **lexical**: deterministic signal extraction with short-circuit guards
//! - **classifier** / **rewriter**: concurrent LLM collaborator calls
//! - **probe**: bounded pre-commit retrieval quality measurement
//! - **engine**: fixed precedence cascade producing one `RouteDecision`

pub mod errors;
pub mod types;
pub mod config;
pub mod collaborators;
pub mod lexical;
pub mod probe;
pub mod classifier;
pub mod rewriter;
pub mod engine;
pub mod telemetry;

// Re-export commonly used types
pub use collaborators::{CompletionClient, Retriever};
pub use config::{RouterConfig, Thresholds};
pub use engine::{resolve, DecisionContext, DecisionEngine};
pub use errors::{Result, RouterError};
pub use types::{Chunk, ClassifierResult, DecisionReason, Intent, RetrievalProbe, RouteDecision};
