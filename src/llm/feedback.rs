//! Feedback request/response value types shared by the generator, the parser
//! and the response assembler.

use serde::Serialize;

use crate::assess::FeedbackTier;

// ---------------------------------------------------------------------------
// FeedbackRequest
// ---------------------------------------------------------------------------

/// Input to one feedback generation.
///
/// The tier is always derived from `accuracy_percent` via
/// [`FeedbackTier::classify`]; it is never taken from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub target: String,
    pub transcript: String,
    pub wrong_units: Vec<String>,
    pub accuracy_percent: u8,
    pub tier: FeedbackTier,
}

impl FeedbackRequest {
    pub fn new(
        target: impl Into<String>,
        transcript: impl Into<String>,
        wrong_units: Vec<String>,
        accuracy_percent: u8,
    ) -> Self {
        Self {
            target: target.into(),
            transcript: transcript.into(),
            wrong_units,
            accuracy_percent,
            tier: FeedbackTier::classify(accuracy_percent),
        }
    }
}

// ---------------------------------------------------------------------------
// TutorFeedback
// ---------------------------------------------------------------------------

/// One concrete correction: what the learner said, what it should be, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub said: String,
    pub correct: String,
    pub reason: String,
}

impl Correction {
    /// Single-line rendering used by the legacy response view.
    ///
    /// ```
    /// use speaking_tutor::llm::Correction;
    ///
    /// let c = Correction { said: "캐".into(), correct: "케".into(), reason: "vowel ㅔ".into() };
    /// assert_eq!(c.to_line(), "캐 → 케 (vowel ㅔ)");
    /// ```
    pub fn to_line(&self) -> String {
        let mut line = format!("{} → {}", self.said, self.correct);
        if !self.reason.is_empty() {
            line.push_str(&format!(" ({})", self.reason));
        }
        line
    }
}

/// Natural-language feedback produced by a successful model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorFeedback {
    /// Locally computed tier (authoritative).
    pub tier: FeedbackTier,
    #[serde(rename = "correctionList")]
    pub corrections: Vec<Correction>,
    pub comment: String,
    /// Tier label the model reported about itself, if any.  Informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_tier: Option<String>,
}
