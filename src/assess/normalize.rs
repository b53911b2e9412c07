//! Text canonicalisation applied to both the target sentence and the STT
//! transcript before they are compared.
//!
//! [`normalize`] performs, in order:
//!
//! 1. Lowercasing (STT engines capitalise inconsistently).
//! 2. Punctuation and symbol removal: every character that is neither
//!    alphanumeric, a combining mark, nor whitespace is dropped.  Combining
//!    marks are kept so Thai tone marks, Devanagari vowel signs, decomposed
//!    Hangul jamo and Latin diacritics survive.
//! 3. Whitespace collapse: runs of any Unicode whitespace become a single
//!    ASCII space; leading/trailing whitespace is trimmed.
//! 4. NFC composition, so a decomposed transcript compares equal to a
//!    precomposed target.
//!
//! The function is total and idempotent.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Canonicalise `text` for fair comparison.
///
/// # Examples
///
/// ```
/// use speaking_tutor::assess::normalize;
///
/// assert_eq!(normalize("  커피,   주세요! "), "커피 주세요");
/// assert_eq!(normalize("Hello,  World."), "hello world");
/// // Thai tone marks are linguistic content and are preserved.
/// assert_eq!(normalize("ไม่ใช่!"), "ไม่ใช่");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !is_linguistic(c) {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out.nfc().collect()
}

/// Split normalized text into user-perceived characters (extended grapheme
/// clusters).  A Thai consonant with its vowel sign and tone mark is one unit.
pub fn graphemes(normalized: &str) -> Vec<&str> {
    normalized.graphemes(true).collect()
}

/// Split normalized text into whitespace-delimited words.
pub fn words(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[inline]
fn is_linguistic(c: char) -> bool {
    c.is_alphanumeric() || is_combining_mark(c)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
