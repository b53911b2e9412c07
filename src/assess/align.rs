//! Diff reconstruction from an edit-operation sequence.
//!
//! [`build_diff`] pairs the canonical operation sequence produced by
//! [`distance`](crate::assess::distance) with the units it was computed over
//! and yields the UI-facing [`Diff`]: one [`ComparisonUnit`] per operation
//! plus the de-duplicated list of target units the learner got wrong.
//!
//! The same `ops` drive both the character error rate and this diff, so the
//! two can never disagree.

use serde::Serialize;

use crate::assess::distance::EditOp;

// ---------------------------------------------------------------------------
// ComparisonUnit
// ---------------------------------------------------------------------------

/// One aligned position in the diff.
///
/// | role         | `target` | `said` |
/// |--------------|----------|--------|
/// | `match`      | yes      | yes (equal) |
/// | `substitute` | yes      | yes (different) |
/// | `delete`     | yes      | no     |
/// | `insert`     | no       | yes    |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonUnit {
    pub role: EditOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub said: Option<String>,
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Ordered alignment plus the target-side units implicated in errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    pub units: Vec<ComparisonUnit>,
    /// Target units involved in a substitution or deletion, in target order,
    /// without duplicates.  A dropped or misheard space is listed as `" "`.
    pub wrong_units: Vec<String>,
}

impl Diff {
    /// Concatenation of every target-side unit (ignores insertions).
    pub fn target_text(&self) -> String {
        self.units.iter().filter_map(|u| u.target.as_deref()).collect()
    }

    /// Concatenation of every transcript-side unit (ignores deletions).
    pub fn transcript_text(&self) -> String {
        self.units.iter().filter_map(|u| u.said.as_deref()).collect()
    }

    /// Number of non-matching positions.
    pub fn error_count(&self) -> usize {
        self.units.iter().filter(|u| u.role != EditOp::Match).count()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a [`Diff`] by replaying `ops` over the two unit sequences.
///
/// `ops` must come from `distance(target, transcript)` over the same slices.
pub fn build_diff(target: &[&str], transcript: &[&str], ops: &[EditOp]) -> Diff {
    let mut target_iter = target.iter();
    let mut transcript_iter = transcript.iter();
    let mut units = Vec::with_capacity(ops.len());
    let mut wrong_units: Vec<String> = Vec::new();

    for &op in ops {
        let t = if op.consumes_target() {
            target_iter.next().map(|s| s.to_string())
        } else {
            None
        };
        let s = if op.consumes_transcript() {
            transcript_iter.next().map(|s| s.to_string())
        } else {
            None
        };

        if matches!(op, EditOp::Substitute | EditOp::Delete) {
            if let Some(unit) = t.as_deref() {
                if !wrong_units.iter().any(|w| w == unit) {
                    wrong_units.push(unit.to_string());
                }
            }
        }

        units.push(ComparisonUnit {
            role: op,
            target: t,
            said: s,
        });
    }

    Diff { units, wrong_units }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
