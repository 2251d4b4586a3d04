//! Decision engine
//!
//! Composes the lexical extractor, intent classifier, query rewriter, and
//! retrieval probe into one routing decision via a fixed precedence policy.
//! The cascade itself (`resolve`) is a pure function of an immutable
//! decision context plus the current thresholds, so any decision is fully
//! replayable offline once classifier and probe values are fixed.
//!
//! No collaborator failure may fail the overall decision: classifier and
//! rewriter failures degrade to absent signals, probe failures degrade to
//! the zero-confidence default, and `decide` always returns a decision.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::classifier::IntentClassifier;
use crate::collaborators::{CompletionClient, Retriever};
use crate::config::{RouterConfig, Thresholds};
use crate::lexical::{LexicalExtractor, LexicalOutcome, LexicalSignal};
use crate::probe::RetrievalProber;
use crate::rewriter::QueryRewriter;
use crate::telemetry::{RouterEvent, RouterTelemetry};
use crate::types::{
    clamp01, round4, ClassifierResult, DecisionReason, Intent, RetrievalProbe, RouteDecision,
};

/// Immutable inputs to the precedence cascade
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub lexical: LexicalSignal,
    pub classifier: Option<ClassifierResult>,
    pub probe: RetrievalProbe,
}

/// Evaluate the fixed precedence rules; first match wins.
///
/// Rule order is part of the contract: grounding evidence (rule 2) outranks
/// a non-retrieval classifier vote, and in particular may override a config
/// vote that fell below its own threshold in rule 1.
pub fn resolve(ctx: &DecisionContext, t: &Thresholds) -> (Intent, f64, DecisionReason) {
    // Rule 1: confident classifier config vote
    if let Some(c) = &ctx.classifier {
        if c.intent == Intent::Config && c.confidence >= t.high_intent {
            return (Intent::Config, c.confidence, DecisionReason::ClassifierConfigHigh);
        }
    }

    // Rule 2: strong grounding evidence wins outright
    if ctx.probe.confidence >= t.high_retrieval {
        return (
            Intent::Retrieval,
            ctx.probe.confidence,
            DecisionReason::RetrievalProbeHigh,
        );
    }

    if let Some(c) = &ctx.classifier {
        // Rule 3: confident retrieval vote corroborated by a modest probe
        if c.intent == Intent::Retrieval
            && c.confidence >= t.high_intent
            && ctx.probe.confidence >= t.low_retrieval
        {
            return (
                Intent::Retrieval,
                c.confidence.max(ctx.probe.confidence),
                DecisionReason::ClassifierRetrievalPlusProbe,
            );
        }

        // Rule 4: confident chat vote with no strong grounding
        if c.intent == Intent::Chat
            && c.confidence >= t.high_intent
            && ctx.probe.confidence < t.high_retrieval
        {
            return (Intent::Chat, c.confidence, DecisionReason::ClassifierChatHigh);
        }
    }

    // Rule 5: keyword lean corroborated by a modest probe
    if ctx.lexical.intent() == Intent::Retrieval && ctx.probe.confidence >= t.low_retrieval {
        return (
            Intent::Retrieval,
            ctx.probe.confidence,
            DecisionReason::LexicalRetrievalWithProbe,
        );
    }

    // Rule 6: default
    let classifier_confidence = ctx.classifier.as_ref().map(|c| c.confidence).unwrap_or(0.0);
    (
        Intent::Chat,
        classifier_confidence.max(ctx.probe.confidence),
        DecisionReason::DefaultChatFallback,
    )
}

/// Routing decision engine over two collaborator contracts
pub struct DecisionEngine {
    extractor: LexicalExtractor,
    classifier: IntentClassifier,
    rewriter: QueryRewriter,
    prober: RetrievalProber,
    config: Arc<RwLock<RouterConfig>>,
    telemetry: RouterTelemetry,
}

impl DecisionEngine {
    /// Create an engine with the default configuration
    pub fn new(completion: Arc<dyn CompletionClient>, retriever: Arc<dyn Retriever>) -> Self {
        Self::with_shared_config(
            completion,
            retriever,
            Arc::new(RwLock::new(RouterConfig::default())),
        )
    }

    /// Create an engine with an owned configuration
    pub fn with_config(
        completion: Arc<dyn CompletionClient>,
        retriever: Arc<dyn Retriever>,
        config: RouterConfig,
    ) -> Self {
        Self::with_shared_config(completion, retriever, Arc::new(RwLock::new(config)))
    }

    /// Create an engine over a shared configuration handle
    ///
    /// Thresholds are snapshotted from the handle at the start of every
    /// decision, so external updates apply to the next decision without
    /// restarting the engine.
    pub fn with_shared_config(
        completion: Arc<dyn CompletionClient>,
        retriever: Arc<dyn Retriever>,
        config: Arc<RwLock<RouterConfig>>,
    ) -> Self {
        Self {
            extractor: LexicalExtractor::new(),
            classifier: IntentClassifier::new(completion.clone()),
            rewriter: QueryRewriter::new(completion),
            prober: RetrievalProber::new(retriever),
            config,
            telemetry: RouterTelemetry::new(),
        }
    }

    pub fn config_handle(&self) -> Arc<RwLock<RouterConfig>> {
        self.config.clone()
    }

    pub fn telemetry(&self) -> &RouterTelemetry {
        &self.telemetry
    }

    /// Route one utterance to a downstream intent
    ///
    /// Logically synchronous to the caller, internally asynchronous.
    /// Infallible: every collaborator failure degrades locally.
    pub async fn decide(&self, utterance: &str) -> RouteDecision {
        let started = Instant::now();
        let trace_id = Uuid::new_v4();
        let config = self.config.read().unwrap().clone();

        self.telemetry.record(RouterEvent::DecisionStarted { trace_id });

        match self.extractor.extract(utterance) {
            LexicalOutcome::ShortCircuit { intent, confidence, reason } => {
                self.telemetry
                    .record(RouterEvent::LexicalShortCircuit { trace_id, reason });
                self.finish(
                    trace_id,
                    started,
                    intent,
                    confidence,
                    reason,
                    utterance.to_string(),
                    RetrievalProbe::zero(),
                    None,
                )
            }
            LexicalOutcome::Signal(lexical) => {
                self.decide_with_collaborators(trace_id, started, utterance, lexical, &config)
                    .await
            }
        }
    }

    /// Full pipeline: classifier ∥ rewriter, then probe, then the cascade
    async fn decide_with_collaborators(
        &self,
        trace_id: Uuid,
        started: Instant,
        utterance: &str,
        lexical: LexicalSignal,
        config: &RouterConfig,
    ) -> RouteDecision {
        let classifier_limit = Duration::from_millis(config.timeouts.classifier_ms);
        let rewriter_limit = Duration::from_millis(config.timeouts.rewriter_ms);
        let probe_limit = Duration::from_millis(config.timeouts.probe_ms);

        let (classified, rewritten) = tokio::join!(
            self.classifier.classify(utterance, classifier_limit),
            self.rewriter.rewrite(utterance, rewriter_limit),
        );

        let classifier = match classified {
            Ok(result) => {
                self.telemetry.record(RouterEvent::ClassifierSettled {
                    trace_id,
                    ok: true,
                    detail: None,
                });
                Some(result)
            }
            Err(err) => {
                self.telemetry.record(RouterEvent::ClassifierSettled {
                    trace_id,
                    ok: false,
                    detail: Some(err.to_string()),
                });
                None
            }
        };

        let retrieval_query = match rewritten {
            Ok(query) => {
                self.telemetry.record(RouterEvent::RewriterSettled {
                    trace_id,
                    ok: true,
                    detail: None,
                });
                query
            }
            Err(err) => {
                self.telemetry.record(RouterEvent::RewriterSettled {
                    trace_id,
                    ok: false,
                    detail: Some(err.to_string()),
                });
                utterance.to_string()
            }
        };

        let probe = match self
            .prober
            .run(&retrieval_query, config.probe.top_k, probe_limit)
            .await
        {
            Ok(probe) => {
                self.telemetry.record(RouterEvent::ProbeSettled {
                    trace_id,
                    ok: true,
                    confidence: probe.confidence,
                    chunk_count: probe.chunk_count,
                    detail: None,
                });
                probe
            }
            Err(err) => {
                self.telemetry.record(RouterEvent::ProbeSettled {
                    trace_id,
                    ok: false,
                    confidence: 0.0,
                    chunk_count: 0,
                    detail: Some(err.to_string()),
                });
                RetrievalProbe::zero()
            }
        };

        let ctx = DecisionContext {
            lexical,
            classifier,
            probe,
        };
        let (intent, confidence, reason) = resolve(&ctx, &config.thresholds);

        self.finish(
            trace_id,
            started,
            intent,
            confidence,
            reason,
            retrieval_query,
            ctx.probe,
            ctx.classifier,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        trace_id: Uuid,
        started: Instant,
        intent: Intent,
        confidence: f64,
        reason: DecisionReason,
        retrieval_query: String,
        retrieval_probe: RetrievalProbe,
        classifier: Option<ClassifierResult>,
    ) -> RouteDecision {
        let latency_ms = started.elapsed().as_millis() as u64;

        self.telemetry.record(RouterEvent::DecisionResolved {
            trace_id,
            intent,
            reason,
            latency_ms,
        });

        RouteDecision {
            intent,
            confidence: round4(clamp01(confidence)),
            reason,
            retrieval_query,
            retrieval_probe,
            classifier,
            trace_id,
            latency_ms,
        }
    }
}
