//! Telemetry for the routing engine
//!
//! Collects one structured record per pipeline stage for correlation.
//! Recording never affects control flow or the returned decision.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

use crate::types::{DecisionReason, Intent};

/// Per-stage routing events
#[derive(Debug, Clone)]
pub enum RouterEvent {
    DecisionStarted {
        trace_id: Uuid,
    },
    LexicalShortCircuit {
        trace_id: Uuid,
        reason: DecisionReason,
    },
    ClassifierSettled {
        trace_id: Uuid,
        ok: bool,
        detail: Option<String>,
    },
    RewriterSettled {
        trace_id: Uuid,
        ok: bool,
        detail: Option<String>,
    },
    ProbeSettled {
        trace_id: Uuid,
        ok: bool,
        confidence: f64,
        chunk_count: usize,
        detail: Option<String>,
    },
    DecisionResolved {
        trace_id: Uuid,
        intent: Intent,
        reason: DecisionReason,
        latency_ms: u64,
    },
}

impl RouterEvent {
    /// Stage that emitted the event
    pub fn scope(&self) -> &'static str {
        match self {
            RouterEvent::DecisionStarted { .. } => "engine",
            RouterEvent::LexicalShortCircuit { .. } => "lexical",
            RouterEvent::ClassifierSettled { .. } => "classifier",
            RouterEvent::RewriterSettled { .. } => "rewriter",
            RouterEvent::ProbeSettled { .. } => "probe",
            RouterEvent::DecisionResolved { .. } => "engine",
        }
    }

    /// Human-readable summary line
    pub fn message(&self) -> String {
        match self {
            RouterEvent::DecisionStarted { .. } => "decision started".to_string(),
            RouterEvent::LexicalShortCircuit { reason, .. } => {
                format!("lexical short-circuit: {}", reason.as_str())
            }
            RouterEvent::ClassifierSettled { ok: true, .. } => "classifier settled".to_string(),
            RouterEvent::ClassifierSettled { ok: false, .. } => {
                "classifier failed, signal absent".to_string()
            }
            RouterEvent::RewriterSettled { ok: true, .. } => "rewriter settled".to_string(),
            RouterEvent::RewriterSettled { ok: false, .. } => {
                "rewriter failed, using original utterance".to_string()
            }
            RouterEvent::ProbeSettled { ok: true, confidence, .. } => {
                format!("probe settled, confidence {:.4}", confidence)
            }
            RouterEvent::ProbeSettled { ok: false, .. } => {
                "probe failed, zero-confidence default".to_string()
            }
            RouterEvent::DecisionResolved { intent, reason, .. } => {
                format!("resolved to {} ({})", intent.as_str(), reason.as_str())
            }
        }
    }

    /// Correlation metadata as a JSON value
    pub fn metadata(&self) -> Value {
        match self {
            RouterEvent::DecisionStarted { trace_id } => json!({ "trace_id": trace_id }),
            RouterEvent::LexicalShortCircuit { trace_id, reason } => {
                json!({ "trace_id": trace_id, "reason": reason })
            }
            RouterEvent::ClassifierSettled { trace_id, ok, detail } => {
                json!({ "trace_id": trace_id, "ok": ok, "detail": detail })
            }
            RouterEvent::RewriterSettled { trace_id, ok, detail } => {
                json!({ "trace_id": trace_id, "ok": ok, "detail": detail })
            }
            RouterEvent::ProbeSettled { trace_id, ok, confidence, chunk_count, detail } => {
                json!({
                    "trace_id": trace_id,
                    "ok": ok,
                    "confidence": confidence,
                    "chunk_count": chunk_count,
                    "detail": detail,
                })
            }
            RouterEvent::DecisionResolved { trace_id, intent, reason, latency_ms } => {
                json!({
                    "trace_id": trace_id,
                    "intent": intent,
                    "reason": reason,
                    "latency_ms": latency_ms,
                })
            }
        }
    }
}

/// Aggregate routing statistics
#[derive(Debug, Clone, Default)]
pub struct RouterStats {
    pub decisions_started: usize,
    pub decisions_resolved: usize,
    pub lexical_short_circuits: usize,
    pub classifier_failures: usize,
    pub rewriter_failures: usize,
    pub probe_failures: usize,
}

/// Telemetry collector shared across decisions
#[derive(Clone)]
pub struct RouterTelemetry {
    events: Arc<Mutex<Vec<RouterEvent>>>,
    stats: Arc<Mutex<RouterStats>>,
    start_time: Instant,
}

impl RouterTelemetry {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(RouterStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: RouterEvent) {
        {
            let mut stats = self.stats.lock().unwrap();
            match &event {
                RouterEvent::DecisionStarted { .. } => {
                    stats.decisions_started += 1;
                }
                RouterEvent::LexicalShortCircuit { .. } => {
                    stats.lexical_short_circuits += 1;
                }
                RouterEvent::ClassifierSettled { ok: false, .. } => {
                    stats.classifier_failures += 1;
                }
                RouterEvent::RewriterSettled { ok: false, .. } => {
                    stats.rewriter_failures += 1;
                }
                RouterEvent::ProbeSettled { ok: false, .. } => {
                    stats.probe_failures += 1;
                }
                RouterEvent::DecisionResolved { .. } => {
                    stats.decisions_resolved += 1;
                }
                _ => {}
            }
        }

        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    /// Get current statistics
    pub fn stats(&self) -> RouterStats {
        self.stats.lock().unwrap().clone()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<RouterEvent> {
        let events = self.events.lock().unwrap();
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Get elapsed time since the collector was created
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for RouterTelemetry {
    fn default() -> Self {
        Self::new()
    }
}
