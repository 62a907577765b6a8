//! Document: a line store plus path, modified and read-only state.
//!
//! Loading accepts `\n`, `\r\n` and lone `\r` line endings, mixed freely.
//! Saving always writes `\n` between lines and nothing after the last one,
//! so N lines produce exactly N−1 separators. A file with one trailing
//! newline therefore loses exactly that newline on a load/save round-trip.
//!
//! Both load and save leave the document untouched when the file operation
//! fails.
//!
//! The editing helpers here set the modified flag but do not look at the
//! read-only flag; [`Session`](crate::session::Session) checks it before it
//! calls them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::line_store::{Line, LineStore};

#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: LineStore,
    path: Option<PathBuf>,
    modified: bool,
    readonly: bool,
}

impl Document {
    /// An unnamed document with one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An unnamed, unmodified document holding `text` split into lines.
    #[must_use]
    pub fn from_bytes(text: &[u8]) -> Self {
        Self {
            lines: LineStore::from_lines(split_lines(text)),
            ..Self::default()
        }
    }

    // -- File I/O -----------------------------------------------------------

    /// Replace the contents with the file at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file cannot be read. The document is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "load failed");
            Error::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.lines = LineStore::from_lines(split_lines(&bytes));
        self.path = Some(path.to_path_buf());
        self.modified = false;
        tracing::info!(path = %path.display(), lines = self.lines.count(), "loaded");
        Ok(())
    }

    /// Write the contents to `path` and make it the document's path.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] if the file cannot be written. The document is
    /// unchanged.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "save failed");
            Error::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.path = Some(path.to_path_buf());
        self.modified = false;
        tracing::info!(path = %path.display(), lines = self.lines.count(), "saved");
        Ok(())
    }

    /// Save to the document's own path.
    ///
    /// # Errors
    ///
    /// [`Error::NoPath`] if the document has no path, otherwise as
    /// [`save`](Self::save).
    pub fn save_current(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoPath)?;
        self.save(&path)
    }

    /// The on-disk form: lines joined by `\n`, no trailing newline.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(line);
        }
        out
    }

    /// Drop all text, leaving one empty line. Path and flags are kept.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.modified = true;
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Associate a path without touching the file (for a file that doesn't
    /// exist yet).
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub const fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    // -- Content ------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.count()
    }

    #[inline]
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&[u8]> {
        self.lines.line(index)
    }

    /// Length of line `index` in bytes, 0 past the end.
    #[inline]
    #[must_use]
    pub fn line_len(&self, index: usize) -> usize {
        self.lines.line_len(index)
    }

    #[inline]
    #[must_use]
    pub const fn lines(&self) -> &LineStore {
        &self.lines
    }

    // -- Editing ------------------------------------------------------------

    pub fn insert_line(&mut self, index: usize, text: Option<&[u8]>) {
        self.lines.insert(index, text);
        self.modified = true;
    }

    pub fn delete_line(&mut self, index: usize) {
        self.lines.delete(index);
        self.modified = true;
    }

    pub fn replace_line(&mut self, index: usize, text: &[u8]) -> bool {
        let done = self.lines.replace(index, text);
        self.modified |= done;
        done
    }

    pub fn insert_byte(&mut self, row: usize, col: usize, byte: u8) -> bool {
        let done = self.lines.splice_byte(row, col, byte);
        self.modified |= done;
        done
    }

    pub fn insert_bytes(&mut self, row: usize, col: usize, bytes: &[u8]) -> bool {
        let done = self.lines.splice(row, col, bytes);
        self.modified |= done;
        done
    }

    pub fn remove_byte(&mut self, row: usize, col: usize) -> Option<u8> {
        let removed = self.lines.remove_byte(row, col);
        self.modified |= removed.is_some();
        removed
    }

    pub fn split_line(&mut self, row: usize, col: usize) -> bool {
        let done = self.lines.split_off(row, col);
        self.modified |= done;
        done
    }

    /// Join line `row + 1` onto line `row`, returning the join column.
    pub fn join_lines(&mut self, row: usize) -> Option<usize> {
        let at = self.lines.join_next(row);
        self.modified |= at.is_some();
        at
    }
}

/// Split file contents into lines.
///
/// `\n` ends a line and a final `\n` does not start another one. Trailing
/// `\r`s are stripped from each line and any `\r` left inside a line also
/// ends it, which covers CRLF, old Mac CR and mixtures of the two.
fn split_lines(bytes: &[u8]) -> Vec<Line> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    if bytes.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for piece in body.split(|&b| b == b'\n') {
        let end = piece.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
        lines.extend(piece[..end].split(|&b| b == b'\r').map(<[u8]>::to_vec));
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
