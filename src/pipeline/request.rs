//! Request parsing and boundary validation.
//!
//! A request is rejected here, before any comparison runs, when the body is
//! not a JSON object or either text field is missing, not a string, blank,
//! or too long.

use serde_json::Value;
use thiserror::Error;

use crate::llm::parse::first_alias;

const TARGET_KEYS: &[&str] = &["targetText"];
const TRANSCRIPT_KEYS: &[&str] = &["transcriptText", "sttText"];

// ---------------------------------------------------------------------------
// RequestError
// ---------------------------------------------------------------------------

/// Why a request was rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a string")]
    NotAString { field: &'static str },

    #[error("{field} must not be empty")]
    Blank { field: &'static str },

    #[error("{field} must be at most {max} characters (got {len})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

// ---------------------------------------------------------------------------
// AssessRequest
// ---------------------------------------------------------------------------

/// A validated-shape assessment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessRequest {
    pub target_text: String,
    pub transcript_text: String,
}

impl AssessRequest {
    pub fn new(target_text: impl Into<String>, transcript_text: impl Into<String>) -> Self {
        Self {
            target_text: target_text.into(),
            transcript_text: transcript_text.into(),
        }
    }

    /// Parse a raw request body.
    ///
    /// ```
    /// use speaking_tutor::pipeline::AssessRequest;
    ///
    /// let req = AssessRequest::from_json(r#"{"targetText":"케이크","sttText":"캐이크"}"#).unwrap();
    /// assert_eq!(req.transcript_text, "캐이크");
    /// ```
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Extract both text fields from an already-parsed body.
    ///
    /// `transcriptText` wins over its alias `sttText` when both are present.
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let object = value.as_object().ok_or(RequestError::NotAnObject)?;

        let field = |keys: &[&str], name: &'static str| -> Result<String, RequestError> {
            match first_alias(object, keys) {
                None => Err(RequestError::Missing { field: name }),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(RequestError::NotAString { field: name }),
            }
        };

        Ok(Self {
            target_text: field(TARGET_KEYS, "targetText")?,
            transcript_text: field(TRANSCRIPT_KEYS, "transcriptText")?,
        })
    }

    /// Check both fields are non-blank and at most `max_chars` characters.
    pub fn validate(&self, max_chars: usize) -> Result<(), RequestError> {
        check_text("targetText", &self.target_text, max_chars)?;
        check_text("transcriptText", &self.transcript_text, max_chars)
    }
}

fn check_text(field: &'static str, text: &str, max_chars: usize) -> Result<(), RequestError> {
    if text.trim().is_empty() {
        return Err(RequestError::Blank { field });
    }
    let len = text.chars().count();
    if len > max_chars {
        return Err(RequestError::TooLong {
            field,
            len,
            max: max_chars,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_fields() {
        let req = AssessRequest::from_json(r#"{"targetText":"커피 주세요","transcriptText":"커피 줘요"}"#)
            .unwrap();
        assert_eq!(req, AssessRequest::new("커피 주세요", "커피 줘요"));
    }

    #[test]
    fn stt_text_alias_is_accepted() {
        let req = AssessRequest::from_json(r#"{"targetText":"a","sttText":"b"}"#).unwrap();
        assert_eq!(req.transcript_text, "b");
    }

    #[test]
    fn transcript_text_wins_over_alias() {
        let req =
            AssessRequest::from_json(r#"{"targetText":"a","sttText":"alias","transcriptText":"main"}"#)
                .unwrap();
        assert_eq!(req.transcript_text, "main");
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = AssessRequest::from_json("{targetText:").unwrap_err();
        assert!(matches!(err, RequestError::InvalidJson(_)));
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            AssessRequest::from_json("[\"a\", \"b\"]").unwrap_err(),
            RequestError::NotAnObject
        );
    }

    #[test]
    fn missing_fields_are_named() {
        assert_eq!(
            AssessRequest::from_json(r#"{"transcriptText":"b"}"#).unwrap_err(),
            RequestError::Missing { field: "targetText" }
        );
        assert_eq!(
            AssessRequest::from_json(r#"{"targetText":"a","transcriptText":null}"#).unwrap_err(),
            RequestError::Missing {
                field: "transcriptText"
            }
        );
    }

    #[test]
    fn non_string_field_is_rejected() {
        assert_eq!(
            AssessRequest::from_json(r#"{"targetText":42,"transcriptText":"b"}"#).unwrap_err(),
            RequestError::NotAString { field: "targetText" }
        );
    }

    #[test]
    fn blank_and_long_fields_fail_validation() {
        let blank = AssessRequest::new("  ", "b");
        assert_eq!(
            blank.validate(10).unwrap_err(),
            RequestError::Blank { field: "targetText" }
        );

        let long = AssessRequest::new("a", "가".repeat(11));
        assert_eq!(
            long.validate(10).unwrap_err(),
            RequestError::TooLong {
                field: "transcriptText",
                len: 11,
                max: 10
            }
        );

        assert!(AssessRequest::new("a", "가".repeat(10)).validate(10).is_ok());
    }
}
