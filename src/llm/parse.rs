//! Model payload parsing.
//!
//! Two stages turn the model's text content into a JSON object:
//!
//! 1. **Strict** — the whole (trimmed) content must be a JSON object.
//! 2. **Recovered** — scan for `{`, cut out the balanced object starting
//!    there (string- and escape-aware), and parse it.  At most
//!    [`MAX_RECOVERY_CANDIDATES`] start positions are tried.
//!
//! If both stages fail the caller gets a [`ParseFailure`] naming the reason
//! for each stage.
//!
//! [`into_feedback`] then maps the object onto [`TutorFeedback`], resolving
//! each canonical field through an ordered alias list (first present key
//! wins) and applying the local tier's tone policy.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::assess::FeedbackTier;
use crate::llm::feedback::{Correction, TutorFeedback};

/// Upper bound on `{` positions examined by the recovery stage.
pub const MAX_RECOVERY_CANDIDATES: usize = 16;

// ---------------------------------------------------------------------------
// Alias tables
// ---------------------------------------------------------------------------

const CORRECTIONS_KEYS: &[&str] = &[
    "corrections",
    "correctionList",
    "correction_list",
    "mistakes",
    "errors",
];
const COMMENT_KEYS: &[&str] = &[
    "comment",
    "feedback",
    "tutorComment",
    "tutor_comment",
    "message",
];
const TIER_KEYS: &[&str] = &["tier", "level", "feedbackLevel", "feedback_level"];
const SAID_KEYS: &[&str] = &["said", "heard", "user", "wrong", "transcript"];
const CORRECT_KEYS: &[&str] = &["correct", "expected", "target", "answer"];
const REASON_KEYS: &[&str] = &["reason", "explanation", "why", "note"];

// ---------------------------------------------------------------------------
// Stage results
// ---------------------------------------------------------------------------

/// Which parse stage produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Strict,
    Recovered,
}

/// A JSON object extracted from model content.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    pub object: Map<String, Value>,
    pub stage: ParseStage,
}

/// Why the recovery stage failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryFailure {
    #[error("no object-shaped substring found")]
    NoObject,
    #[error("{attempts} candidate object(s) failed to parse, last error: {last_error}")]
    Malformed { attempts: usize, last_error: String },
}

/// Both stages failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model payload is not valid JSON (strict: {strict}; recovery: {recovery})")]
pub struct ParseFailure {
    pub strict: String,
    pub recovery: RecoveryFailure,
}

// ---------------------------------------------------------------------------
// Stage 1 + 2
// ---------------------------------------------------------------------------

/// Parse model content into a JSON object, strictly first, then by
/// extracting the first well-formed object substring.
///
/// ```
/// use speaking_tutor::llm::parse::{parse_payload, ParseStage};
///
/// let strict = parse_payload(r#"{"comment":"ok"}"#).unwrap();
/// assert_eq!(strict.stage, ParseStage::Strict);
///
/// let fenced = parse_payload("```json\n{\"comment\":\"ok\"}\n```").unwrap();
/// assert_eq!(fenced.stage, ParseStage::Recovered);
/// ```
pub fn parse_payload(text: &str) -> Result<ParsedPayload, ParseFailure> {
    let strict = match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(object)) => {
            return Ok(ParsedPayload {
                object,
                stage: ParseStage::Strict,
            })
        }
        Ok(other) => format!("expected a JSON object, found {}", json_kind(&other)),
        Err(e) => e.to_string(),
    };

    match recover_object(text) {
        Ok(object) => Ok(ParsedPayload {
            object,
            stage: ParseStage::Recovered,
        }),
        Err(recovery) => Err(ParseFailure { strict, recovery }),
    }
}

fn recover_object(text: &str) -> Result<Map<String, Value>, RecoveryFailure> {
    let mut attempts = 0;
    let mut last_error = None;

    for (start, _) in text.match_indices('{').take(MAX_RECOVERY_CANDIDATES) {
        let Some(end) = balanced_object_end(&text[start..]) else {
            continue;
        };
        attempts += 1;
        match serde_json::from_str::<Value>(&text[start..start + end]) {
            Ok(Value::Object(object)) => return Ok(object),
            Ok(other) => last_error = Some(format!("found {}", json_kind(&other))),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    match last_error {
        Some(last_error) => Err(RecoveryFailure::Malformed {
            attempts,
            last_error,
        }),
        None => Err(RecoveryFailure::NoObject),
    }
}

/// Byte length of the balanced `{ … }` at the start of `s`, ignoring braces
/// inside JSON strings.
fn balanced_object_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Field normalization
// ---------------------------------------------------------------------------

/// First alias in `keys` that is present and non-null in `object`.
pub fn first_alias<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn alias_str(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_alias(object, keys)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

fn to_correction(value: &Value) -> Option<Correction> {
    let entry = value.as_object()?;
    let said = alias_str(entry, SAID_KEYS).unwrap_or_default();
    let correct = alias_str(entry, CORRECT_KEYS).unwrap_or_default();
    if said.is_empty() && correct.is_empty() {
        return None;
    }
    Some(Correction {
        said,
        correct,
        reason: alias_str(entry, REASON_KEYS).unwrap_or_default(),
    })
}

/// Map a parsed object onto [`TutorFeedback`] under `local_tier`.
///
/// * The returned tier is always `local_tier`; the model's own label is kept
///   in `reported_tier` and a disagreement is logged.
/// * Under [`FeedbackTier::Correct`] the correction list is dropped.
/// * A payload with neither a comment nor any correction is rejected.
pub fn into_feedback(
    object: &Map<String, Value>,
    local_tier: FeedbackTier,
) -> Result<TutorFeedback, String> {
    let mut corrections: Vec<Correction> = match first_alias(object, CORRECTIONS_KEYS) {
        Some(Value::Array(items)) => items.iter().filter_map(to_correction).collect(),
        Some(single) if single.is_object() => to_correction(single).into_iter().collect(),
        _ => Vec::new(),
    };

    let comment = alias_str(object, COMMENT_KEYS).unwrap_or_default();
    let reported_tier = alias_str(object, TIER_KEYS).filter(|t| !t.is_empty());

    if let Some(label) = reported_tier.as_deref() {
        match FeedbackTier::from_label(label) {
            Some(reported) if reported != local_tier => log::warn!(
                "feedback: model reported tier '{label}' but local tier is '{local_tier}'; using local tier"
            ),
            None => log::debug!("feedback: unrecognised tier label '{label}' from model"),
            _ => {}
        }
    }

    if !local_tier.allows_corrections() && !corrections.is_empty() {
        log::debug!(
            "feedback: dropping {} correction(s) under tier '{local_tier}'",
            corrections.len()
        );
        corrections.clear();
    }

    if comment.is_empty() && corrections.is_empty() {
        return Err("model payload contains neither a comment nor any corrections".into());
    }

    Ok(TutorFeedback {
        tier: local_tier,
        corrections,
        comment,
        reported_tier,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // parse_payload
    // -----------------------------------------------------------------------

    #[test]
    fn strict_parse_succeeds_on_clean_json() {
        let parsed = parse_payload("  {\"comment\": \"좋아요\"}  ").unwrap();
        assert_eq!(parsed.stage, ParseStage::Strict);
        assert_eq!(parsed.object["comment"], "좋아요");
    }

    #[test]
    fn recovers_object_wrapped_in_prose() {
        let text = "Sure! Here is the feedback:\n{\"comment\": \"다시 해 보세요\", \"corrections\": []}\nHope it helps.";
        let parsed = parse_payload(text).unwrap();
        assert_eq!(parsed.stage, ParseStage::Recovered);
        assert_eq!(parsed.object["comment"], "다시 해 보세요");
    }

    #[test]
    fn recovery_ignores_braces_inside_strings() {
        let text = "note {\"comment\": \"use {braces} carefully\", \"x\": \"\\\"}\"} trailing";
        let parsed = parse_payload(text).unwrap();
        assert_eq!(parsed.stage, ParseStage::Recovered);
        assert_eq!(parsed.object["comment"], "use {braces} carefully");
    }

    #[test]
    fn recovery_skips_malformed_candidate_and_takes_next() {
        let text = "{not json} then {\"comment\": \"ok\"}";
        let parsed = parse_payload(text).unwrap();
        assert_eq!(parsed.stage, ParseStage::Recovered);
        assert_eq!(parsed.object["comment"], "ok");
    }

    #[test]
    fn no_object_fails_both_stages_with_no_object() {
        let err = parse_payload("I cannot help with that.").unwrap_err();
        assert!(!err.strict.is_empty());
        assert_eq!(err.recovery, RecoveryFailure::NoObject);
    }

    #[test]
    fn unbalanced_object_is_no_object() {
        let err = parse_payload("{\"comment\": \"cut off").unwrap_err();
        assert_eq!(err.recovery, RecoveryFailure::NoObject);
    }

    #[test]
    fn malformed_object_reports_attempts() {
        let err = parse_payload("prefix {comment: 'single quotes'} suffix").unwrap_err();
        match err.recovery {
            RecoveryFailure::Malformed { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("unexpected recovery failure: {other:?}"),
        }
    }

    #[test]
    fn recovery_stops_after_candidate_limit() {
        // The valid object is the 17th `{`, past the scan limit.
        let text = format!(
            "{}{{\"comment\":\"ok\"}}",
            "{x} ".repeat(MAX_RECOVERY_CANDIDATES)
        );
        let err = parse_payload(&text).unwrap_err();
        match err.recovery {
            RecoveryFailure::Malformed { attempts, .. } => {
                assert_eq!(attempts, MAX_RECOVERY_CANDIDATES)
            }
            other => panic!("unexpected recovery failure: {other:?}"),
        }

        // One fewer malformed candidate and the object is reached.
        let text = format!(
            "{}{{\"comment\":\"ok\"}}",
            "{x} ".repeat(MAX_RECOVERY_CANDIDATES - 1)
        );
        let parsed = parse_payload(&text).expect("object within the limit");
        assert_eq!(parsed.stage, ParseStage::Recovered);
    }

    #[test]
    fn top_level_array_is_not_accepted_strictly() {
        let err = parse_payload("[1, 2, 3]").unwrap_err();
        assert!(err.strict.contains("an array"), "{}", err.strict);
    }

    // -----------------------------------------------------------------------
    // into_feedback
    // -----------------------------------------------------------------------

    #[test]
    fn canonical_fields_map_directly() {
        let obj = object(json!({
            "tier": "partial",
            "corrections": [{"said": "캐", "correct": "케", "reason": "ㅔ vowel"}],
            "comment": "Nice try! Watch the first syllable."
        }));
        let fb = into_feedback(&obj, FeedbackTier::Partial).unwrap();
        assert_eq!(fb.tier, FeedbackTier::Partial);
        assert_eq!(fb.corrections.len(), 1);
        assert_eq!(fb.corrections[0].said, "캐");
        assert_eq!(fb.corrections[0].correct, "케");
        assert_eq!(fb.reported_tier.as_deref(), Some("partial"));
    }

    #[test]
    fn alternate_keys_are_accepted() {
        let obj = object(json!({
            "feedbackLevel": "severe",
            "mistakes": [{"heard": "캐", "expected": "케", "explanation": "vowel"}],
            "feedback": "The sentence is 케이크. Try again."
        }));
        let fb = into_feedback(&obj, FeedbackTier::Severe).unwrap();
        assert_eq!(fb.comment, "The sentence is 케이크. Try again.");
        assert_eq!(fb.corrections[0].reason, "vowel");
        assert_eq!(fb.reported_tier.as_deref(), Some("severe"));
    }

    #[test]
    fn first_alias_wins_deterministically() {
        let obj = object(json!({
            "message": "third",
            "feedback": "second",
            "comment": "first"
        }));
        let fb = into_feedback(&obj, FeedbackTier::Partial).unwrap();
        assert_eq!(fb.comment, "first");
    }

    #[test]
    fn null_alias_falls_through_to_next() {
        let obj = object(json!({"comment": null, "feedback": "fallback key"}));
        let fb = into_feedback(&obj, FeedbackTier::Partial).unwrap();
        assert_eq!(fb.comment, "fallback key");
    }

    #[test]
    fn local_tier_overrides_reported_tier() {
        let obj = object(json!({"tier": "correct", "comment": "Try again."}));
        let fb = into_feedback(&obj, FeedbackTier::Severe).unwrap();
        assert_eq!(fb.tier, FeedbackTier::Severe);
        assert_eq!(fb.reported_tier.as_deref(), Some("correct"));
    }

    #[test]
    fn correct_tier_drops_corrections() {
        let obj = object(json!({
            "comment": "Perfect!",
            "corrections": [{"said": "a", "correct": "b"}]
        }));
        let fb = into_feedback(&obj, FeedbackTier::Correct).unwrap();
        assert!(fb.corrections.is_empty());
        assert_eq!(fb.comment, "Perfect!");
    }

    #[test]
    fn empty_payload_is_rejected() {
        let obj = object(json!({"tier": "correct"}));
        assert!(into_feedback(&obj, FeedbackTier::Correct).is_err());
    }

    #[test]
    fn correct_tier_with_only_corrections_is_rejected() {
        let obj = object(json!({"corrections": [{"said": "a", "correct": "b"}]}));
        assert!(into_feedback(&obj, FeedbackTier::Correct).is_err());
    }

    #[test]
    fn invalid_correction_entries_are_skipped() {
        let obj = object(json!({
            "corrections": ["just a string", {"reason": "no forms"}, {"said": "x", "correct": "y"}],
            "comment": ""
        }));
        let fb = into_feedback(&obj, FeedbackTier::Partial).unwrap();
        assert_eq!(fb.corrections.len(), 1);
        assert_eq!(fb.corrections[0].reason, "");
    }

    #[test]
    fn single_correction_object_is_accepted() {
        let obj = object(json!({"errors": {"said": "x", "correct": "y"}}));
        let fb = into_feedback(&obj, FeedbackTier::Partial).unwrap();
        assert_eq!(fb.corrections.len(), 1);
    }
}
