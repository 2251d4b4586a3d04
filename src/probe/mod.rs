//! Retrieval confidence probe
//!
//! One bounded retrieval call, condensed into a single confidence metric.
//! A lone strong hit is weak evidence of real coverage; consistency across
//! the top 3 plus a wide margin over the runner-up raises trust that the
//! knowledge base genuinely holds relevant material rather than a
//! coincidental embedding match. Hence the weighting below.

use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::Retriever;
use crate::errors::{Result, RouterError};
use crate::types::{clamp01, round4, Chunk, RetrievalProbe};

const WEIGHT_TOP: f64 = 0.55;
const WEIGHT_AVG_TOP3: f64 = 0.35;
const WEIGHT_GAP: f64 = 0.10;

impl RetrievalProbe {
    /// Condense a ranked chunk list (descending by score) into a probe
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        let top_score = chunks.first().map(|c| c.score).unwrap_or(0.0);

        let top3 = &chunks[..chunks.len().min(3)];
        let avg_top3 = if top3.is_empty() {
            0.0
        } else {
            top3.iter().map(|c| c.score).sum::<f64>() / top3.len() as f64
        };

        // The margin needs a runner-up to be meaningful; with fewer than
        // two chunks it contributes nothing.
        let score_gap = chunks
            .get(1)
            .map(|second| (top_score - second.score).max(0.0))
            .unwrap_or(0.0);

        let confidence = round4(clamp01(
            WEIGHT_TOP * top_score + WEIGHT_AVG_TOP3 * avg_top3 + WEIGHT_GAP * score_gap,
        ));

        Self {
            confidence,
            top_score,
            avg_top3,
            score_gap,
            chunk_count: chunks.len(),
        }
    }
}

/// Runs the bounded pre-commit retrieval call
pub struct RetrievalProber {
    retriever: Arc<dyn Retriever>,
}

impl RetrievalProber {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }

    /// Probe the knowledge base for one query
    ///
    /// Errors cover transport failures and the boundary timeout; the engine
    /// degrades both to `RetrievalProbe::zero` rather than failing the
    /// decision.
    pub async fn run(&self, query: &str, top_k: usize, limit: Duration) -> Result<RetrievalProbe> {
        let call = self.retriever.retrieve(query, top_k);

        let mut chunks = tokio::time::timeout(limit, call)
            .await
            .map_err(|_| RouterError::Timeout {
                duration_ms: limit.as_millis() as u64,
            })??;

        // The contract promises descending order; enforce it anyway so the
        // gap and top-3 math stay meaningful with sloppy collaborators.
        chunks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        Ok(RetrievalProbe::from_chunks(&chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn chunk(score: f64) -> Chunk {
        Chunk {
            content: "text".to_string(),
            source: "doc.md".to_string(),
            score,
        }
    }

    #[test]
    fn test_probe_no_chunks_is_zero() {
        let probe = RetrievalProbe::from_chunks(&[]);
        assert_eq!(probe.confidence, 0.0);
        assert_eq!(probe.chunk_count, 0);
    }

    #[test]
    fn test_probe_single_chunk() {
        // One chunk: avg_top3 equals the score and there is no runner-up,
        // so confidence = clamp01(0.55*s + 0.35*s + 0)
        let probe = RetrievalProbe::from_chunks(&[chunk(0.8)]);
        let expected = round4(clamp01(0.55 * 0.8 + 0.35 * 0.8));
        assert_eq!(probe.confidence, expected);
        assert_eq!(probe.top_score, 0.8);
        assert_eq!(probe.avg_top3, 0.8);
        assert_eq!(probe.score_gap, 0.0);
    }

    #[test]
    fn test_probe_three_chunks() {
        let probe = RetrievalProbe::from_chunks(&[chunk(0.9), chunk(0.7), chunk(0.5)]);
        assert_eq!(probe.top_score, 0.9);
        assert!((probe.avg_top3 - 0.7).abs() < 1e-9);
        assert!((probe.score_gap - 0.2).abs() < 1e-9);
        let expected = round4(0.55 * 0.9 + 0.35 * 0.7 + 0.10 * probe.score_gap);
        assert_eq!(probe.confidence, expected);
        assert_eq!(probe.chunk_count, 3);
    }

    #[test]
    fn test_probe_uses_only_top_three() {
        let many = vec![chunk(0.9), chunk(0.8), chunk(0.7), chunk(0.1), chunk(0.0)];
        let probe = RetrievalProbe::from_chunks(&many);
        assert!((probe.avg_top3 - 0.8).abs() < 1e-9);
        assert_eq!(probe.chunk_count, 5);
    }

    #[test]
    fn test_probe_confidence_clamped() {
        let probe = RetrievalProbe::from_chunks(&[chunk(1.0)]);
        assert!(probe.confidence <= 1.0);
    }

    struct FixedRetriever(Vec<Chunk>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<Chunk>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<Chunk>> {
            Err(RouterError::UpstreamStatus {
                status: 502,
                body: "down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_prober_sorts_unordered_chunks() {
        let prober = RetrievalProber::new(Arc::new(FixedRetriever(vec![
            chunk(0.5),
            chunk(0.9),
            chunk(0.7),
        ])));

        let probe = prober
            .run("leave policy", 5, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(probe.top_score, 0.9);
        assert!((probe.score_gap - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_prober_propagates_failure() {
        let prober = RetrievalProber::new(Arc::new(FailingRetriever));
        let result = prober.run("anything", 5, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(RouterError::UpstreamStatus { .. })));
    }
}
