//! Minimum edit distance with a single canonical operation sequence.
//!
//! [`distance`] fills the classic Levenshtein dynamic-programming table over
//! suffixes (substitution, insertion and deletion all cost 1; a match costs 0)
//! and then walks it forward from the origin to recover **one** optimal
//! alignment.  When several minimum-cost paths exist the walk prefers, at each
//! step in reading order:
//!
//! ```text
//! Match  >  Substitute  >  Delete  >  Insert
//! ```
//!
//! so identical inputs always produce identical diffs, and of two equal-cost
//! delete/insert placements the deletion comes first.
//!
//! The sequence on the left (`target`) is the reference: a [`EditOp::Delete`]
//! is a unit the learner left out, an [`EditOp::Insert`] is a unit only the
//! transcript contains.

use serde::Serialize;

// ---------------------------------------------------------------------------
// EditOp
// ---------------------------------------------------------------------------

/// One step of an alignment between a target and a transcript sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOp {
    /// Target and transcript unit are equal (cost 0).
    Match,
    /// Target unit was replaced by a different transcript unit.
    Substitute,
    /// Unit present only in the transcript.
    Insert,
    /// Unit present only in the target.
    Delete,
}

impl EditOp {
    /// Whether this operation consumes a unit from the target side.
    pub fn consumes_target(self) -> bool {
        !matches!(self, EditOp::Insert)
    }

    /// Whether this operation consumes a unit from the transcript side.
    pub fn consumes_transcript(self) -> bool {
        !matches!(self, EditOp::Delete)
    }

    /// Cost contributed by this operation.
    pub fn cost(self) -> usize {
        match self {
            EditOp::Match => 0,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Result of [`distance`]: the minimum cost and the canonical path that
/// achieves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Minimum number of edit operations.
    pub cost: usize,
    /// Operations in target/transcript order.
    pub ops: Vec<EditOp>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the minimum edit distance between `target` and `transcript` and
/// the canonical operation sequence.
///
/// Total over any pair of finite sequences, including empty ones.
///
/// # Examples
///
/// ```
/// use speaking_tutor::assess::{distance, EditOp};
///
/// let target: Vec<char> = "케이크".chars().collect();
/// let said: Vec<char> = "캐이크".chars().collect();
///
/// let alignment = distance(&target, &said);
/// assert_eq!(alignment.cost, 1);
/// assert_eq!(alignment.ops, vec![EditOp::Substitute, EditOp::Match, EditOp::Match]);
/// ```
pub fn distance<T: PartialEq>(target: &[T], transcript: &[T]) -> Alignment {
    let table = Table::fill(target, transcript);
    let ops = table.walk(target, transcript);
    Alignment {
        cost: table.get(0, 0),
        ops,
    }
}

/// Number of DP cells [`distance`] allocates for inputs of these lengths.
///
/// The runner uses this to decide whether to move the computation off the
/// async worker threads.
pub fn table_cells(target_len: usize, transcript_len: usize) -> usize {
    target_len
        .saturating_add(1)
        .saturating_mul(transcript_len.saturating_add(1))
}

// ---------------------------------------------------------------------------
// DP table
// ---------------------------------------------------------------------------

/// `cells[i * width + j]` is the edit distance between `target[i..]` and
/// `transcript[j..]`.
struct Table {
    cells: Vec<usize>,
    width: usize,
}

impl Table {
    fn fill<T: PartialEq>(target: &[T], transcript: &[T]) -> Self {
        let (n, m) = (target.len(), transcript.len());
        let width = m + 1;
        let mut cells = vec![0usize; (n + 1) * width];

        for (j, cell) in cells[n * width..].iter_mut().enumerate() {
            *cell = m - j;
        }
        for i in (0..n).rev() {
            cells[i * width + m] = n - i;
            for j in (0..m).rev() {
                let sub = if target[i] == transcript[j] { 0 } else { 1 };
                let diag = cells[(i + 1) * width + (j + 1)] + sub;
                let down = cells[(i + 1) * width + j] + 1;
                let right = cells[i * width + (j + 1)] + 1;
                cells[i * width + j] = diag.min(down).min(right);
            }
        }

        Self { cells, width }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }

    /// Walk from the origin to the far corner, choosing the highest-priority
    /// successor that is consistent with the table.
    fn walk<T: PartialEq>(&self, target: &[T], transcript: &[T]) -> Vec<EditOp> {
        let (n, m) = (target.len(), transcript.len());
        let (mut i, mut j) = (0, 0);
        let mut ops = Vec::with_capacity(n.max(m));

        while i < n || j < m {
            let here = self.get(i, j);
            let both = i < n && j < m;

            let op = if both && target[i] == transcript[j] && self.get(i + 1, j + 1) == here {
                EditOp::Match
            } else if both && self.get(i + 1, j + 1) + 1 == here {
                EditOp::Substitute
            } else if i < n && self.get(i + 1, j) + 1 == here {
                EditOp::Delete
            } else {
                EditOp::Insert
            };

            if op.consumes_target() {
                i += 1;
            }
            if op.consumes_transcript() {
                j += 1;
            }
            ops.push(op);
        }

        ops
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
