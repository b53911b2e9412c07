//! One-shot comparison of a target sentence against a transcript.
//!
//! [`compare`] is the synchronous, CPU-bound part of an assessment: it
//! normalizes both strings, aligns them at grapheme and word granularity,
//! and derives [`Metrics`], the [`Diff`] and the [`FeedbackTier`].  The
//! grapheme alignment feeds both the character error rate and the diff.

use crate::assess::align::{build_diff, Diff};
use crate::assess::distance::{distance, table_cells};
use crate::assess::metrics::{Metrics, UnitCounts};
use crate::assess::normalize::{graphemes, normalize, words};
use crate::assess::tier::FeedbackTier;

/// Everything computed locally for one target/transcript pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub normalized_target: String,
    pub normalized_transcript: String,
    pub metrics: Metrics,
    pub diff: Diff,
    pub tier: FeedbackTier,
}

/// Compare `target` against `transcript`.  Never fails.
///
/// ```
/// use speaking_tutor::assess::{compare, FeedbackTier};
///
/// let c = compare("커피 주세요", "커피 주세요");
/// assert_eq!(c.metrics.accuracy_percent, 100);
/// assert_eq!(c.tier, FeedbackTier::Correct);
/// assert!(c.diff.wrong_units.is_empty());
/// ```
pub fn compare(target: &str, transcript: &str) -> Comparison {
    let normalized_target = normalize(target);
    let normalized_transcript = normalize(transcript);

    let target_chars = graphemes(&normalized_target);
    let transcript_chars = graphemes(&normalized_transcript);
    let char_alignment = distance(&target_chars, &transcript_chars);

    let target_words = words(&normalized_target);
    let transcript_words = words(&normalized_transcript);
    let word_alignment = distance(&target_words, &transcript_words);

    let metrics = Metrics::from_costs(
        UnitCounts {
            cost: char_alignment.cost,
            target_len: target_chars.len(),
            transcript_len: transcript_chars.len(),
        },
        UnitCounts {
            cost: word_alignment.cost,
            target_len: target_words.len(),
            transcript_len: transcript_words.len(),
        },
    );

    let diff = build_diff(&target_chars, &transcript_chars, &char_alignment.ops);
    let tier = FeedbackTier::classify(metrics.accuracy_percent);

    log::debug!(
        "compare: chars {}→{} cost={} words {}→{} cost={} accuracy={}%",
        target_chars.len(),
        transcript_chars.len(),
        char_alignment.cost,
        target_words.len(),
        transcript_words.len(),
        word_alignment.cost,
        metrics.accuracy_percent
    );

    Comparison {
        normalized_target,
        normalized_transcript,
        metrics,
        diff,
        tier,
    }
}

/// Upper bound on the DP cells [`compare`] will allocate for these inputs.
///
/// Uses raw `char` counts, which are never smaller than grapheme counts.
pub fn estimated_cells(target: &str, transcript: &str) -> usize {
    table_cells(target.chars().count(), transcript.chars().count())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
