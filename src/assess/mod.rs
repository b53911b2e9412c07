//! Deterministic assessment core.
//!
//! This module provides:
//! * [`normalize`] — punctuation/whitespace canonicalisation.
//! * [`distance`] — edit distance with one canonical [`EditOp`] sequence.
//! * [`build_diff`] — [`Diff`] reconstruction for UI highlighting.
//! * [`Metrics`] — character/word error rates and accuracy percentages.
//! * [`FeedbackTier`] — the three-tier tone policy.
//! * [`compare`] — all of the above for one target/transcript pair.
//!
//! Nothing here performs I/O or fails.

pub mod align;
pub mod compare;
pub mod distance;
pub mod metrics;
pub mod normalize;
pub mod tier;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use align::{build_diff, ComparisonUnit, Diff};
pub use compare::{compare, estimated_cells, Comparison};
pub use distance::{distance, table_cells, Alignment, EditOp};
pub use metrics::{accuracy_from_rate, error_rate, Metrics, UnitCounts};
pub use normalize::{graphemes, normalize, words};
pub use tier::FeedbackTier;
