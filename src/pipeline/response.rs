//! Response assembly.
//!
//! [`AssessmentResponse::assemble`] merges the local [`Comparison`] with the
//! outcome of feedback generation.  Exactly one of `tutor` / `tutorError` is
//! set.  The legacy `corrections` / `comment` fields are a projection of
//! `tutor` for older clients.

use serde::Serialize;
use serde_json::{json, Value};

use crate::assess::{Comparison, Diff, FeedbackTier, Metrics};
use crate::llm::{FeedbackError, TutorFeedback};
use crate::pipeline::request::RequestError;

// ---------------------------------------------------------------------------
// TutorErrorView
// ---------------------------------------------------------------------------

/// Wire form of a [`FeedbackError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorErrorView {
    pub code: &'static str,
    pub message: String,
    /// HTTP status for `HTTP_ERROR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Bounded excerpt of the offending body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&FeedbackError> for TutorErrorView {
    fn from(e: &FeedbackError) -> Self {
        Self {
            code: e.code.as_str(),
            message: e.message.clone(),
            status: e.code.http_status(),
            details: e.raw_excerpt.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// AssessmentResponse
// ---------------------------------------------------------------------------

/// Root response object for a processed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub ok: bool,
    pub text_accuracy_percent: u8,
    pub mistake_percent: u8,
    pub score: u8,
    pub tier: FeedbackTier,
    pub metrics: Metrics,
    pub diff: Diff,
    pub tutor: Option<TutorFeedback>,
    pub tutor_error: Option<TutorErrorView>,

    // Legacy view
    pub corrections: Vec<String>,
    pub comment: Option<String>,
}

impl AssessmentResponse {
    pub fn assemble(
        comparison: &Comparison,
        feedback: Result<TutorFeedback, FeedbackError>,
    ) -> Self {
        let metrics = comparison.metrics;

        let (tutor, tutor_error) = match feedback {
            Ok(fb) => (Some(fb), None),
            Err(e) => (None, Some(TutorErrorView::from(&e))),
        };

        let corrections = tutor
            .as_ref()
            .map(|fb| fb.corrections.iter().map(|c| c.to_line()).collect())
            .unwrap_or_default();
        let comment = tutor
            .as_ref()
            .map(|fb| fb.comment.clone())
            .filter(|c| !c.is_empty());

        Self {
            ok: true,
            text_accuracy_percent: metrics.accuracy_percent,
            mistake_percent: metrics.wrong_percent,
            score: metrics.accuracy_percent,
            tier: comparison.tier,
            metrics,
            diff: comparison.diff.clone(),
            tutor,
            tutor_error,
            corrections,
            comment,
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// HTTP-style status plus JSON body, as returned by
/// [`handle_request`](crate::pipeline::handle_request).
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn ok(response: &AssessmentResponse) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status: 200,
            body: serde_json::to_value(response)?,
        })
    }

    pub fn bad_request(error: &RequestError) -> Self {
        Self {
            status: 400,
            body: json!({ "ok": false, "error": error.to_string() }),
        }
    }

    pub fn server_error(details: impl std::fmt::Display) -> Self {
        Self {
            status: 500,
            body: json!({
                "ok": false,
                "error": "assessment failed",
                "details": details.to_string()
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
