//! Best-effort extraction of one JSON object from free-form model text
//!
//! Models wrap structured output in prose or markdown code fences more often
//! than not. This parser strips optional fencing, then scans for the first
//! balanced top-level `{...}` substring with a single-pass depth counter
//! (quote and escape aware, so braces inside string values don't unbalance
//! the scan). It returns `None` instead of erroring; callers must handle the
//! unparseable case explicitly.

use serde_json::Value;

use crate::types::{clamp01, ClassifierResult, Intent};

/// Confidence assumed when the classifier omits or garbles the field
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Strip a markdown code fence (``` or ```json) wrapping the payload
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Find the first balanced top-level JSON object substring
///
/// Single pass: depth increments on `{`, decrements on `}`, both ignored
/// while inside a double-quoted string. Returns `None` when no complete
/// object exists.
pub fn extract_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start?..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse classifier output into a validated `ClassifierResult`
///
/// Any failure — no object, invalid JSON, intent outside the 3-value enum —
/// yields `None`. A missing or non-numeric confidence defaults to 0.5 and is
/// always clamped to [0,1].
pub fn parse_classifier_output(text: &str) -> Option<ClassifierResult> {
    let body = strip_code_fences(text);
    let object = extract_balanced_object(body)?;
    let value: Value = serde_json::from_str(object).ok()?;

    let intent = Intent::parse(value.get("intent")?.as_str()?)?;

    let confidence = clamp01(
        value
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_CONFIDENCE),
    );

    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ClassifierResult {
        intent,
        confidence,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_plain_fence() {
        let text = "```\n{\"intent\": \"chat\"}\n```";
        assert_eq!(strip_code_fences(text), "{\"intent\": \"chat\"}");
    }

    #[test]
    fn test_strip_json_fence() {
        let text = "```json\n{\"intent\": \"chat\"}\n```";
        assert_eq!(strip_code_fences(text), "{\"intent\": \"chat\"}");
    }

    #[test]
    fn test_strip_without_fence_is_identity() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_object_with_surrounding_prose() {
        let text = "Sure! Here is my answer: {\"intent\": \"config\"} hope that helps";
        assert_eq!(extract_balanced_object(text), Some("{\"intent\": \"config\"}"));
    }

    #[test]
    fn test_extract_nested_object() {
        let text = "{\"a\": {\"b\": 1}, \"c\": 2} trailing";
        assert_eq!(
            extract_balanced_object(text),
            Some("{\"a\": {\"b\": 1}, \"c\": 2}")
        );
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let text = r#"{"reason": "matches {pattern} syntax", "intent": "chat"}"#;
        assert_eq!(extract_balanced_object(text), Some(text));
    }

    #[test]
    fn test_extract_incomplete_object_returns_none() {
        assert_eq!(extract_balanced_object("{\"intent\": \"chat\""), None);
        assert_eq!(extract_balanced_object("no json here"), None);
    }

    #[test]
    fn test_parse_valid_output() {
        let result = parse_classifier_output(
            r#"{"intent": "retrieval", "confidence": 0.82, "reason": "policy question"}"#,
        )
        .unwrap();
        assert_eq!(result.intent, Intent::Retrieval);
        assert_eq!(result.confidence, 0.82);
        assert_eq!(result.reason, "policy question");
    }

    #[test]
    fn test_parse_fenced_output() {
        let result = parse_classifier_output(
            "```json\n{\"intent\": \"Config\", \"confidence\": 0.9, \"reason\": \"rule syntax\"}\n```",
        )
        .unwrap();
        assert_eq!(result.intent, Intent::Config);
    }

    #[test]
    fn test_parse_missing_confidence_defaults() {
        let result = parse_classifier_output(r#"{"intent": "chat"}"#).unwrap();
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.reason, "");
    }

    #[test]
    fn test_parse_confidence_clamped() {
        let result = parse_classifier_output(r#"{"intent": "chat", "confidence": 1.7}"#).unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_parse_invalid_intent_yields_none() {
        assert!(parse_classifier_output(r#"{"intent": "banana", "confidence": 0.9}"#).is_none());
        assert!(parse_classifier_output(r#"{"confidence": 0.9}"#).is_none());
    }

    #[test]
    fn test_parse_garbage_yields_none() {
        assert!(parse_classifier_output("I think this is a chat message").is_none());
        assert!(parse_classifier_output("").is_none());
    }
}
