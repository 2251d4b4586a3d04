//! Lexical signal extraction
//!
//! Pure, deterministic, no I/O. Produces either an immediate short-circuit
//! decision (empty input, small talk, strong config vocabulary) or a
//! `LexicalSignal` that seeds the later precedence cascade. Short-circuits
//! skip every network collaborator, which is the engine's main latency and
//! cost guard.

use regex::Regex;

use crate::types::{DecisionReason, Intent};

/// Fixed config vocabulary. Narrow and high-precision: a single whole-word
/// match is enough to commit to the config path.
const CONFIG_TERMS: &[&str] = &[
    "config",
    "configs",
    "configuration",
    "configurations",
    "rule",
    "rules",
    "batch",
    "batch config",
    "threshold",
    "thresholds",
    "auto approve",
    "auto reject",
];

/// Domain vocabulary that suggests the private knowledge base may help
const RETRIEVAL_TERMS: &[&str] = &[
    "policy",
    "policies",
    "compliance",
    "incident",
    "incidents",
    "leave",
    "vacation",
    "security",
    "handbook",
    "document",
    "documents",
    "guideline",
    "guidelines",
    "procedure",
    "procedures",
    "regulation",
    "regulations",
    "gdpr",
    "audit",
    "benefits",
    "onboarding",
];

/// Interrogative phrases that mark a request as a question
const QUESTION_CUES: &[&str] = &[
    "what is",
    "what are",
    "how do",
    "how to",
    "how does",
    "when is",
    "when does",
    "where is",
    "who is",
    "explain",
    "tell me about",
    "can you find",
];

/// Conditional-rule shapes that only appear in config-generation requests
const RULE_PATTERNS: &[(&str, &str)] = &[
    ("if_then", r"\bif\b.*\bthen\b"),
    ("when_then", r"\bwhen\b.*\bthen\b"),
    ("score_comparator", r"\bscore\s*(<=|>=|<|>)\s*\d+"),
];

/// Greeting/thanks/farewell shapes matched against the whole input
const SMALL_TALK_PATTERNS: &[&str] = &[
    r"^(hi|hiya|hello|hey|yo|howdy)( there)?[\s!,.]*$",
    r"^good (morning|afternoon|evening|day)[\s!,.]*$",
    r"^(thanks|thank you( so much)?|thx|ty|cheers)[\s!,.]*$",
    r"^(bye|goodbye|good night|see you( later)?|see ya|later)[\s!,.]*$",
    r"^how are you( doing| today)?[\s?!,.]*$",
    r"^(ok|okay|cool|great|nice)[\s!,.]*$",
];

/// Deterministic keyword evidence extracted from one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalSignal {
    pub matched_config_terms: Vec<String>,
    pub matched_config_patterns: Vec<String>,
    pub matched_retrieval_terms: Vec<String>,
    pub matched_question_cues: Vec<String>,
    pub config_score: u32,
    pub retrieval_score: u32,
}

impl LexicalSignal {
    /// Lexical lean used by the cascade's tie-break rule: at least one
    /// whole-word domain term match (each is worth 2 points)
    pub fn leans_retrieval(&self) -> bool {
        self.retrieval_score >= 2
    }

    /// Intent suggested by keyword evidence alone
    pub fn intent(&self) -> Intent {
        if self.config_score >= 1 {
            Intent::Config
        } else if self.leans_retrieval() {
            Intent::Retrieval
        } else {
            Intent::Chat
        }
    }
}

/// Outcome of lexical extraction
#[derive(Debug, Clone, PartialEq)]
pub enum LexicalOutcome {
    /// Decision is already made; no collaborator may be invoked
    ShortCircuit {
        intent: Intent,
        confidence: f64,
        reason: DecisionReason,
    },
    /// No short-circuit fired; signal seeds the precedence cascade
    Signal(LexicalSignal),
}

/// Compiled term lists and patterns for lexical extraction
pub struct LexicalExtractor {
    small_talk: Vec<Regex>,
    config_terms: Vec<(String, Regex)>,
    rule_patterns: Vec<(String, Regex)>,
    retrieval_terms: Vec<(String, Regex)>,
    question_cues: Vec<(String, Regex)>,
    information: Regex,
}

/// Build a whole-word regex for a term. `\s+` between words tolerates
/// internal whitespace; `\b` anchors prevent matching inside larger tokens.
fn whole_word_regex(term: &str) -> Regex {
    let words: Vec<String> = term.split_whitespace().map(regex::escape).collect();
    let pattern = format!(r"\b{}\b", words.join(r"\s+"));
    Regex::new(&pattern).expect("valid term pattern")
}

fn compile_terms(terms: &[&str]) -> Vec<(String, Regex)> {
    terms
        .iter()
        .map(|term| (term.to_string(), whole_word_regex(term)))
        .collect()
}

impl LexicalExtractor {
    pub fn new() -> Self {
        Self {
            small_talk: SMALL_TALK_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("valid small-talk pattern"))
                .collect(),
            config_terms: compile_terms(CONFIG_TERMS),
            rule_patterns: RULE_PATTERNS
                .iter()
                .map(|(name, p)| (name.to_string(), Regex::new(p).expect("valid rule pattern")))
                .collect(),
            retrieval_terms: compile_terms(RETRIEVAL_TERMS),
            question_cues: compile_terms(QUESTION_CUES),
            information: whole_word_regex("information"),
        }
    }

    /// Extract lexical evidence from a raw utterance
    pub fn extract(&self, utterance: &str) -> LexicalOutcome {
        let text = utterance.trim().to_lowercase();

        if text.is_empty() {
            return LexicalOutcome::ShortCircuit {
                intent: Intent::Chat,
                confidence: 1.0,
                reason: DecisionReason::EmptyInput,
            };
        }

        if self.small_talk.iter().any(|p| p.is_match(&text)) {
            return LexicalOutcome::ShortCircuit {
                intent: Intent::Chat,
                confidence: 0.98,
                reason: DecisionReason::SmallTalkGuard,
            };
        }

        let matched_config_terms = self.matches(&self.config_terms, &text);
        let matched_config_patterns = self.matches(&self.rule_patterns, &text);

        let config_score = matched_config_terms.len() as u32
            + if matched_config_patterns.is_empty() { 0 } else { 2 };

        if config_score >= 1 {
            return LexicalOutcome::ShortCircuit {
                intent: Intent::Config,
                confidence: 0.95,
                reason: DecisionReason::StrongConfigPattern,
            };
        }

        let matched_retrieval_terms = self.matches(&self.retrieval_terms, &text);
        let matched_question_cues = self.matches(&self.question_cues, &text);

        let term_matches = matched_retrieval_terms.len() as u32;
        let question_mark_bonus = if text.contains('?') && term_matches > 0 { 1 } else { 0 };
        let information_bonus = if self.information.is_match(&text) { 1 } else { 0 };
        let cue_bonus = if matched_question_cues.is_empty() { 0 } else { 1 };

        let retrieval_score = 2 * term_matches + question_mark_bonus + information_bonus + cue_bonus;

        LexicalOutcome::Signal(LexicalSignal {
            matched_config_terms,
            matched_config_patterns,
            matched_retrieval_terms,
            matched_question_cues,
            config_score,
            retrieval_score,
        })
    }

    fn matches(&self, compiled: &[(String, Regex)], text: &str) -> Vec<String> {
        compiled
            .iter()
            .filter(|(_, pattern)| pattern.is_match(text))
            .map(|(term, _)| term.clone())
            .collect()
    }
}

impl Default for LexicalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LexicalExtractor {
        LexicalExtractor::new()
    }

    fn expect_signal(outcome: LexicalOutcome) -> LexicalSignal {
        match outcome {
            LexicalOutcome::Signal(signal) => signal,
            other => panic!("expected signal, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_short_circuits_to_chat() {
        for input in ["", "   ", "\t\n"] {
            assert_eq!(
                extractor().extract(input),
                LexicalOutcome::ShortCircuit {
                    intent: Intent::Chat,
                    confidence: 1.0,
                    reason: DecisionReason::EmptyInput,
                }
            );
        }
    }

    #[test]
    fn test_small_talk_guard() {
        for input in ["hello", "Hello!", "  thanks ", "good morning", "How are you?", "bye"] {
            assert_eq!(
                extractor().extract(input),
                LexicalOutcome::ShortCircuit {
                    intent: Intent::Chat,
                    confidence: 0.98,
                    reason: DecisionReason::SmallTalkGuard,
                },
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_small_talk_requires_whole_input() {
        // A greeting prefix on a real question must not divert it
        let outcome = extractor().extract("hello, what is the leave policy?");
        assert!(matches!(outcome, LexicalOutcome::Signal(_)));
    }

    #[test]
    fn test_config_term_short_circuits() {
        assert_eq!(
            extractor().extract("generate a batch config for weekly imports"),
            LexicalOutcome::ShortCircuit {
                intent: Intent::Config,
                confidence: 0.95,
                reason: DecisionReason::StrongConfigPattern,
            }
        );
    }

    #[test]
    fn test_conditional_rule_pattern_short_circuits() {
        for input in [
            "if score < 7 then reject",
            "reject the application when amount is high then notify finance",
            "flag anything with score >= 90",
        ] {
            assert_eq!(
                extractor().extract(input),
                LexicalOutcome::ShortCircuit {
                    intent: Intent::Config,
                    confidence: 0.95,
                    reason: DecisionReason::StrongConfigPattern,
                },
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_whole_word_matching_rejects_substrings() {
        // "rules" inside "unruless" or "batch" inside "batches"? "batches"
        // contains "batch" as a prefix but not on a word boundary pair
        let signal = expect_signal(extractor().extract("the overruled motion was denied"));
        assert!(signal.matched_config_terms.is_empty());
        assert_eq!(signal.config_score, 0);
    }

    #[test]
    fn test_multi_word_term_tolerates_internal_whitespace() {
        assert_eq!(
            extractor().extract("set up a batch   config for imports"),
            LexicalOutcome::ShortCircuit {
                intent: Intent::Config,
                confidence: 0.95,
                reason: DecisionReason::StrongConfigPattern,
            }
        );
    }

    #[test]
    fn test_retrieval_scoring() {
        let signal = expect_signal(extractor().extract("what is the leave policy?"));
        // "leave" + "policy" = 2 terms (4 points), question mark with terms
        // (1), "what is" cue (1)
        assert_eq!(signal.retrieval_score, 6);
        assert!(signal.leans_retrieval());
        assert_eq!(signal.intent(), Intent::Retrieval);
    }

    #[test]
    fn test_question_mark_bonus_requires_term_match() {
        let signal = expect_signal(extractor().extract("is it sunny today?"));
        assert_eq!(signal.retrieval_score, 0);
        assert!(!signal.leans_retrieval());
    }

    #[test]
    fn test_information_bonus() {
        let signal = expect_signal(extractor().extract("I need information"));
        assert_eq!(signal.retrieval_score, 1);
        assert!(!signal.leans_retrieval());
        assert_eq!(signal.intent(), Intent::Chat);
    }

    #[test]
    fn test_plain_chat_input_scores_zero() {
        let signal = expect_signal(extractor().extract("write a haiku about autumn"));
        assert_eq!(signal.config_score, 0);
        assert_eq!(signal.retrieval_score, 0);
        assert_eq!(signal.intent(), Intent::Chat);
    }

    #[test]
    fn test_determinism() {
        let extractor = extractor();
        let first = extractor.extract("what does the security handbook say about GDPR?");
        let second = extractor.extract("what does the security handbook say about GDPR?");
        assert_eq!(first, second);
    }
}
