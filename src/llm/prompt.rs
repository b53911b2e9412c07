//! Prompt builder for tutor feedback.
//!
//! [`PromptBuilder::build_chat`] returns a `(system_msg, user_msg)` pair for
//! an OpenAI-compatible `/v1/chat/completions` endpoint.
//!
//! * The **system** message fixes the role, the JSON output shape, the general
//!   rules and, as a hard constraint, the tone rules of the locally computed
//!   [`FeedbackTier`](crate::assess::FeedbackTier).
//! * The **user** message carries the evidence: target sentence, transcript,
//!   accuracy, tier and the wrong-unit list.

use crate::llm::feedback::FeedbackRequest;

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

const SYSTEM_ROLE: &str = "\
You are a spoken-language tutor. A learner read a target sentence aloud and a
speech recogniser transcribed what they said. The accuracy score has already
been computed; do NOT recompute or second-guess it. Your job is to explain it.";

const OUTPUT_SHAPE: &str = "\
Reply with ONLY one JSON object, no markdown, in exactly this shape:
{\"tier\": \"correct|partial|severe\", \"corrections\": [{\"said\": \"...\", \"correct\": \"...\", \"reason\": \"...\"}], \"comment\": \"...\"}";

const GENERAL_RULES: &str = "\
Rules:
1. \"tier\" MUST be the tier given in the request.
2. Base corrections on the listed wrong characters; quote the learner's form in \"said\" and the target form in \"correct\".
3. Keep \"comment\" to at most two short sentences.
4. Never invent words that are not in the target sentence.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds feedback prompts.
///
/// # Example
/// ```rust
/// use speaking_tutor::llm::{FeedbackRequest, PromptBuilder};
///
/// let builder = PromptBuilder::new("English");
/// let request = FeedbackRequest::new("케이크", "캐이크", vec!["케".into()], 67);
/// let (system, user) = builder.build_chat(&request);
/// assert!(system.contains("partial"));
/// assert!(user.contains("케이크"));
/// ```
pub struct PromptBuilder {
    explanation_language: String,
}

impl PromptBuilder {
    /// Create a builder whose comments and reasons are written in
    /// `explanation_language` (e.g. `"English"`, `"Korean"`).
    pub fn new(explanation_language: &str) -> Self {
        Self {
            explanation_language: explanation_language.to_string(),
        }
    }

    /// Build the **(system_msg, user_msg)** pair for one request.
    pub fn build_chat(&self, request: &FeedbackRequest) -> (String, String) {
        let tier = request.tier;

        let mut system_msg = String::with_capacity(1536);
        system_msg.push_str(SYSTEM_ROLE);
        system_msg.push_str("\n\n");
        system_msg.push_str(OUTPUT_SHAPE);
        system_msg.push_str("\n\n");
        system_msg.push_str(GENERAL_RULES);
        system_msg.push_str(&format!(
            "\n5. Write \"comment\" and every \"reason\" in {}.",
            self.explanation_language
        ));
        system_msg.push_str(&format!(
            "\n\nTone constraint for tier \"{}\" (mandatory):\n{}",
            tier.as_str(),
            tier.tone_instruction()
        ));

        let wrong_units = if request.wrong_units.is_empty() {
            "none".to_string()
        } else {
            request
                .wrong_units
                .iter()
                .map(|u| format!("\"{u}\""))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let user_msg = format!(
            "Target sentence: \"{}\"\n\
             Learner said (transcript): \"{}\"\n\
             Accuracy: {}%\n\
             Tier: {}\n\
             Wrong characters in the target: {}\n",
            request.target,
            request.transcript,
            request.accuracy_percent,
            tier.as_str(),
            wrong_units
        );

        (system_msg, user_msg)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("English")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
