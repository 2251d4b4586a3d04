//! LLM intent classifier
//!
//! Asks the completion collaborator for a minimal structured opinion on
//! where an utterance should route. The call is bounded by a timeout and
//! every failure mode degrades to an absent signal at the engine.

use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::CompletionClient;
use crate::errors::{Result, RouterError};
use crate::types::ClassifierResult;

pub mod parser;

pub use parser::{extract_balanced_object, parse_classifier_output, strip_code_fences};

const SYSTEM_PROMPT: &str = "You are an intent classifier for an internal assistant. \
Classify the user's request into exactly one intent: \
\"chat\" (general conversation), \
\"retrieval\" (a question answerable from private company documents), or \
\"config\" (a request to generate structured configuration from rules). \
Respond with a single JSON object and nothing else: \
{\"intent\": \"...\", \"confidence\": 0.0-1.0, \"reason\": \"...\"}";

/// Classifier over a shared completion collaborator
pub struct IntentClassifier {
    client: Arc<dyn CompletionClient>,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Classify one utterance within the given boundary timeout
    ///
    /// Errors cover transport failures, the timeout, and unparseable or
    /// invalid structured output. The engine recovers all of them locally.
    pub async fn classify(&self, utterance: &str, limit: Duration) -> Result<ClassifierResult> {
        let call = self.client.complete(Some(SYSTEM_PROMPT), utterance);

        let text = tokio::time::timeout(limit, call)
            .await
            .map_err(|_| RouterError::Timeout {
                duration_ms: limit.as_millis() as u64,
            })??;

        parse_classifier_output(&text).ok_or_else(|| {
            RouterError::MalformedOutput(format!(
                "classifier returned no valid intent object: {:.120}",
                text
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Intent;
    use async_trait::async_trait;

    struct FixedCompletion(String);

    #[async_trait]
    impl CompletionClient for FixedCompletion {
        async fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl CompletionClient for FailingCompletion {
        async fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String> {
            Err(RouterError::UpstreamStatus {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_classify_parses_structured_reply() {
        let classifier = IntentClassifier::new(Arc::new(FixedCompletion(
            r#"{"intent": "retrieval", "confidence": 0.8, "reason": "policy"}"#.to_string(),
        )));

        let result = classifier
            .classify("what is the leave policy", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.intent, Intent::Retrieval);
        assert_eq!(result.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_classify_rejects_prose_reply() {
        let classifier = IntentClassifier::new(Arc::new(FixedCompletion(
            "this looks like a chat message to me".to_string(),
        )));

        let result = classifier.classify("hello world", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(RouterError::MalformedOutput(_))));
    }

    #[tokio::test]
    async fn test_classify_propagates_transport_error() {
        let classifier = IntentClassifier::new(Arc::new(FailingCompletion));
        let result = classifier.classify("anything", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(RouterError::UpstreamStatus { .. })));
    }
}
