//! Accuracy-tier classification and the tone policy attached to each tier.
//!
//! The tier is computed locally from the accuracy percentage **before** the
//! feedback model is called and is sent to it as a constraint.  Whatever tier
//! the model reports back is informational only.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Lowest accuracy that still counts as [`FeedbackTier::Correct`].
pub const CORRECT_MIN_PERCENT: u8 = 90;

/// Lowest accuracy that counts as [`FeedbackTier::Partial`].
pub const PARTIAL_MIN_PERCENT: u8 = 50;

// ---------------------------------------------------------------------------
// Tone instructions
// ---------------------------------------------------------------------------

const TONE_CORRECT: &str = "\
The learner said the sentence correctly.
- Give ONE short sentence of affirmation.
- Do NOT list any corrections; \"corrections\" must be an empty array.";

const TONE_PARTIAL: &str = "\
The learner was partly correct.
- Start by briefly acknowledging the effort.
- Then name each wrong part specifically and give the corrected form.
- Every entry in \"corrections\" needs \"said\", \"correct\" and \"reason\".";

const TONE_SEVERE: &str = "\
The learner's attempt was far from the target sentence.
- Do NOT use any praise or affirming language (no \"good\", \"great\", \"well done\", \"almost\").
- State the correct target sentence plainly.
- List the most important corrections.
- End by asking the learner to try again.";

// ---------------------------------------------------------------------------
// FeedbackTier
// ---------------------------------------------------------------------------

/// Feedback severity derived purely from the accuracy percentage.
///
/// | accuracy   | tier      |
/// |------------|-----------|
/// | `>= 90`    | `Correct` |
/// | `50 ..= 89`| `Partial` |
/// | `< 50`     | `Severe`  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTier {
    Correct,
    Partial,
    Severe,
}

impl FeedbackTier {
    /// Classify an accuracy percentage.
    ///
    /// ```
    /// use speaking_tutor::assess::FeedbackTier;
    ///
    /// assert_eq!(FeedbackTier::classify(90), FeedbackTier::Correct);
    /// assert_eq!(FeedbackTier::classify(89), FeedbackTier::Partial);
    /// assert_eq!(FeedbackTier::classify(49), FeedbackTier::Severe);
    /// ```
    pub fn classify(accuracy_percent: u8) -> Self {
        if accuracy_percent >= CORRECT_MIN_PERCENT {
            FeedbackTier::Correct
        } else if accuracy_percent >= PARTIAL_MIN_PERCENT {
            FeedbackTier::Partial
        } else {
            FeedbackTier::Severe
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackTier::Correct => "correct",
            FeedbackTier::Partial => "partial",
            FeedbackTier::Severe => "severe",
        }
    }

    /// Tier-specific tone rules embedded in the system prompt.
    pub fn tone_instruction(self) -> &'static str {
        match self {
            FeedbackTier::Correct => TONE_CORRECT,
            FeedbackTier::Partial => TONE_PARTIAL,
            FeedbackTier::Severe => TONE_SEVERE,
        }
    }

    /// Whether feedback for this tier may list corrections.
    pub fn allows_corrections(self) -> bool {
        !matches!(self, FeedbackTier::Correct)
    }

    /// Interpret a tier label reported by the model.
    ///
    /// Accepts the canonical names case-insensitively plus a few common
    /// synonyms.  Returns `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "correct" | "perfect" | "good" | "high" => Some(FeedbackTier::Correct),
            "partial" | "medium" | "mid" | "okay" => Some(FeedbackTier::Partial),
            "severe" | "wrong" | "incorrect" | "low" => Some(FeedbackTier::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(FeedbackTier::classify(100), FeedbackTier::Correct);
        assert_eq!(FeedbackTier::classify(90), FeedbackTier::Correct);
        assert_eq!(FeedbackTier::classify(89), FeedbackTier::Partial);
        assert_eq!(FeedbackTier::classify(50), FeedbackTier::Partial);
        assert_eq!(FeedbackTier::classify(49), FeedbackTier::Severe);
        assert_eq!(FeedbackTier::classify(0), FeedbackTier::Severe);
    }

    #[test]
    fn every_percentage_maps_to_exactly_one_tier() {
        for pct in 0..=100u8 {
            let tier = FeedbackTier::classify(pct);
            let expected = if pct >= 90 {
                FeedbackTier::Correct
            } else if pct >= 50 {
                FeedbackTier::Partial
            } else {
                FeedbackTier::Severe
            };
            assert_eq!(tier, expected, "pct={pct}");
        }
    }

    #[test]
    fn severe_tone_forbids_praise() {
        let tone = FeedbackTier::Severe.tone_instruction();
        assert!(tone.contains("Do NOT use any praise"));
        assert!(tone.contains("try again"));
    }

    #[test]
    fn correct_tone_forbids_corrections() {
        assert!(FeedbackTier::Correct
            .tone_instruction()
            .contains("must be an empty array"));
        assert!(!FeedbackTier::Correct.allows_corrections());
        assert!(FeedbackTier::Partial.allows_corrections());
    }

    #[test]
    fn parses_reported_labels() {
        assert_eq!(FeedbackTier::from_label(" Partial "), Some(FeedbackTier::Partial));
        assert_eq!(FeedbackTier::from_label("SEVERE"), Some(FeedbackTier::Severe));
        assert_eq!(FeedbackTier::from_label("banana"), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(FeedbackTier::Correct).unwrap(),
            serde_json::json!("correct")
        );
        assert_eq!(FeedbackTier::Severe.to_string(), "severe");
    }
}
