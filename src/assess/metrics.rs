//! Error rates and the accuracy percentage derived from them.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Deterministic scores for one target/transcript pair.
///
/// `accuracy_percent + wrong_percent == 100` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Character error rate in `[0, 1]`.
    #[serde(rename = "cer")]
    pub character_error_rate: f64,
    /// Word error rate in `[0, 1]`.
    #[serde(rename = "wer")]
    pub word_error_rate: f64,
    /// `round((1 - cer) * 100)`, in `[0, 100]`.
    pub accuracy_percent: u8,
    /// `100 - accuracy_percent`.
    pub wrong_percent: u8,
}

impl Metrics {
    /// Build metrics from character- and word-level edit costs.
    ///
    /// The accuracy percentage is driven by the character error rate; the
    /// word error rate is reported alongside it.
    pub fn from_costs(chars: UnitCounts, words: UnitCounts) -> Self {
        let cer = error_rate(chars);
        let wer = error_rate(words);
        let accuracy_percent = accuracy_from_rate(cer);
        Self {
            character_error_rate: cer,
            word_error_rate: wer,
            accuracy_percent,
            wrong_percent: 100 - accuracy_percent,
        }
    }
}

/// Edit cost together with the lengths of the two sequences it was
/// computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCounts {
    pub cost: usize,
    pub target_len: usize,
    pub transcript_len: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `cost / max(1, target_len)`, clamped to `[0, 1]`.
///
/// An empty target yields `1.0` when the transcript is non-empty and `0.0`
/// otherwise.
pub fn error_rate(counts: UnitCounts) -> f64 {
    if counts.target_len == 0 {
        return if counts.transcript_len == 0 { 0.0 } else { 1.0 };
    }
    let rate = counts.cost as f64 / counts.target_len.max(1) as f64;
    rate.clamp(0.0, 1.0)
}

/// Convert an error rate into a whole accuracy percentage in `[0, 100]`.
pub fn accuracy_from_rate(rate: f64) -> u8 {
    let pct = ((1.0 - rate.clamp(0.0, 1.0)) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
