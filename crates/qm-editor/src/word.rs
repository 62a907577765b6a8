//! Word boundaries within a single line.
//!
//! A word is a maximal run of ASCII letters, digits and `_`. Every other
//! byte (spaces, punctuation, anything non-ASCII) separates words. Line
//! wrapping is the cursor's job; these functions never leave the line.

/// `[A-Za-z0-9_]`.
#[inline]
#[must_use]
pub const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Column after skipping the rest of the word at `col`, then the non-word
/// bytes after it.
///
/// Returns `line.len()` when no further word starts on this line.
#[must_use]
pub fn forward_word(line: &[u8], col: usize) -> usize {
    let len = line.len();
    let mut col = col.min(len);
    while col < len && is_word_byte(line[col]) {
        col += 1;
    }
    while col < len && !is_word_byte(line[col]) {
        col += 1;
    }
    col
}

/// Start of the word before `col`.
///
/// Steps back one byte, skips non-word bytes, then moves to the start of the
/// word found there. Returns 0 from column 0.
#[must_use]
pub fn backward_word(line: &[u8], col: usize) -> usize {
    let mut col = col.min(line.len());
    if col == 0 {
        return 0;
    }
    col -= 1;
    while col > 0 && !is_word_byte(line[col]) {
        col -= 1;
    }
    while col > 0 && is_word_byte(line[col - 1]) {
        col -= 1;
    }
    col
}
