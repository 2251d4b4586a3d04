//! Core data model for routing decisions
//!
//! A `RouteDecision` is the single immutable artifact produced per request.
//! Downstream handlers dispatch purely on `intent` and may substitute
//! `retrieval_query` for the raw utterance in their own retrieval calls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Downstream processing path chosen for an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// General conversational completion
    Chat,
    /// Retrieval-grounded question answering
    Retrieval,
    /// Structured configuration generation
    Config,
}

impl Intent {
    /// Parse a model-supplied intent label, case-insensitively
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "chat" => Some(Intent::Chat),
            "retrieval" => Some(Intent::Retrieval),
            "config" => Some(Intent::Config),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Chat => "chat",
            Intent::Retrieval => "retrieval",
            Intent::Config => "config",
        }
    }
}

/// Fixed set of reason codes a decision can carry, never free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    EmptyInput,
    SmallTalkGuard,
    StrongConfigPattern,
    ClassifierConfigHigh,
    RetrievalProbeHigh,
    ClassifierRetrievalPlusProbe,
    ClassifierChatHigh,
    LexicalRetrievalWithProbe,
    DefaultChatFallback,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::EmptyInput => "empty_input",
            DecisionReason::SmallTalkGuard => "small_talk_guard",
            DecisionReason::StrongConfigPattern => "strong_config_pattern",
            DecisionReason::ClassifierConfigHigh => "classifier_config_high",
            DecisionReason::RetrievalProbeHigh => "retrieval_probe_high",
            DecisionReason::ClassifierRetrievalPlusProbe => "classifier_retrieval_plus_probe",
            DecisionReason::ClassifierChatHigh => "classifier_chat_high",
            DecisionReason::LexicalRetrievalWithProbe => "lexical_retrieval_with_probe",
            DecisionReason::DefaultChatFallback => "default_chat_fallback",
        }
    }
}

/// One scored unit of retrieved content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub score: f64,
}

/// Structured opinion returned by the LLM intent classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub intent: Intent,
    pub confidence: f64,
    pub reason: String,
}

/// Condensed retrieval-quality measurement over the top-K chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalProbe {
    pub confidence: f64,
    pub top_score: f64,
    pub avg_top3: f64,
    pub score_gap: f64,
    pub chunk_count: usize,
}

impl RetrievalProbe {
    /// Zero-confidence default used when the retrieval call fails
    pub fn zero() -> Self {
        Self {
            confidence: 0.0,
            top_score: 0.0,
            avg_top3: 0.0,
            score_gap: 0.0,
            chunk_count: 0,
        }
    }
}

/// Final immutable routing artifact, one per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    pub intent: Intent,
    /// Always clamped to [0,1] and rounded to 4 decimals
    pub confidence: f64,
    pub reason: DecisionReason,
    /// Query for downstream retrieval; falls back to the original utterance
    pub retrieval_query: String,
    pub retrieval_probe: RetrievalProbe,
    pub classifier: Option<ClassifierResult>,
    pub trace_id: Uuid,
    pub latency_ms: u64,
}

/// Clamp a confidence value into [0,1]
pub fn clamp01(value: f64) -> f64 {
    value.max(0.0).min(1.0)
}

/// Round a confidence value to 4 decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
