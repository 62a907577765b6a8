//! Line store: the ordered lines of a document.
//!
//! Lines are raw bytes without their terminator. Columns everywhere in the
//! editor are byte offsets into these lines, so a file loads and saves back
//! byte-for-byte regardless of its encoding.
//!
//! The store is never empty: an empty document is a single empty line, and
//! deleting the last remaining line blanks it instead of removing it.
//!
//! Indices are lenient. `insert` clamps its index to `[0, count]`, `delete`
//! clamps to the last line, and the other accessors return `None`/`false`
//! for lines that don't exist. Nothing here panics on a bad index.

/// One line of text, without `\n` or `\r`.
pub type Line = Vec<u8>;

/// Ordered, never-empty sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<Line>,
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStore {
    /// A store holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
        }
    }

    /// Build a store from lines. An empty list becomes one empty line.
    #[must_use]
    pub fn from_lines(lines: Vec<Line>) -> Self {
        if lines.is_empty() {
            Self::new()
        } else {
            Self { lines }
        }
    }

    // -- Queries ------------------------------------------------------------

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    /// Content of line `index`.
    #[inline]
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&[u8]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    /// Length in bytes of line `index`, or 0 if it doesn't exist.
    #[inline]
    #[must_use]
    pub fn line_len(&self, index: usize) -> usize {
        self.lines.get(index).map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }

    // -- Line-level edits ---------------------------------------------------

    /// Insert a copy of `text` (empty when `None`) as a new line at `index`.
    ///
    /// `index` is clamped to `[0, count]`; lines at or after it move down.
    pub fn insert(&mut self, index: usize, text: Option<&[u8]>) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, text.map(<[u8]>::to_vec).unwrap_or_default());
    }

    /// Remove line `index`, clamped to the last line.
    ///
    /// With a single line left, the line is emptied instead.
    pub fn delete(&mut self, index: usize) {
        if self.lines.len() == 1 {
            self.lines[0].clear();
            return;
        }
        let index = index.min(self.lines.len() - 1);
        self.lines.remove(index);
    }

    /// Overwrite line `index` with `text`. Returns `false` if the line
    /// doesn't exist.
    pub fn replace(&mut self, index: usize, text: &[u8]) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.clear();
        line.extend_from_slice(text);
        true
    }

    /// Reset to a single empty line.
    pub fn clear(&mut self) {
        self.lines.truncate(1);
        self.lines[0].clear();
    }

    // -- Byte-level edits ---------------------------------------------------

    /// Insert `byte` into line `index` at `col` (clamped to the line length).
    pub fn splice_byte(&mut self, index: usize, col: usize, byte: u8) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        let col = col.min(line.len());
        line.insert(col, byte);
        true
    }

    /// Insert `bytes` into line `index` at `col` (clamped to the line length).
    pub fn splice(&mut self, index: usize, col: usize, bytes: &[u8]) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        let col = col.min(line.len());
        line.splice(col..col, bytes.iter().copied());
        true
    }

    /// Remove and return the byte at `col` in line `index`.
    pub fn remove_byte(&mut self, index: usize, col: usize) -> Option<u8> {
        let line = self.lines.get_mut(index)?;
        (col < line.len()).then(|| line.remove(col))
    }

    /// Split line `index` at `col`: the bytes from `col` on become a new line
    /// at `index + 1`. `col` is clamped to the line length.
    pub fn split_off(&mut self, index: usize, col: usize) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        let col = col.min(line.len());
        let right = line.split_off(col);
        self.lines.insert(index + 1, right);
        true
    }

    /// Append `bytes` to the end of line `index`.
    pub fn append(&mut self, index: usize, bytes: &[u8]) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.extend_from_slice(bytes);
        true
    }

    /// Join line `index + 1` onto the end of line `index`.
    ///
    /// Returns the join column (the old length of line `index`), or `None`
    /// when there is no next line.
    pub fn join_next(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.lines.len() {
            return None;
        }
        let next = self.lines.remove(index + 1);
        let at = self.line_len(index);
        self.append(index, &next);
        Some(at)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
