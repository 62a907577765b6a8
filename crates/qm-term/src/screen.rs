// SPDX-License-Identifier: MIT
//
// Row-based screen with a line-level diff.
//
// The application paints whole rows of text into the back frame. `render`
// compares each row against what was last written to the terminal and only
// rewrites the rows that changed, wrapped in synchronized output so the
// terminal never shows half a frame.
//
// Every row is one run of text with a single attribute (plain or reverse
// video). That is all an editor with a status bar needs, and it keeps the
// diff to a string comparison per row.

use std::io::{self, Write};

use crate::ansi;

// ─── Row ────────────────────────────────────────────────────────────────────

/// One painted screen row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Text already clipped to the screen width.
    pub text: String,
    /// Reverse video for the whole row.
    pub inverse: bool,
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Back frame plus the last frame written to the terminal.
#[derive(Debug)]
pub struct Screen {
    cols: u16,
    rows: u16,
    back: Vec<Row>,
    /// `None` means the terminal content is unknown and the row must be
    /// written regardless.
    front: Vec<Option<Row>>,
}

impl Screen {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            back: vec![Row::default(); usize::from(rows)],
            front: vec![None; usize::from(rows)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Change dimensions. Forces a full redraw on the next render.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.back = vec![Row::default(); usize::from(rows)];
        self.front = vec![None; usize::from(rows)];
    }

    /// Blank every row of the back frame.
    pub fn clear(&mut self) {
        for row in &mut self.back {
            row.text.clear();
            row.inverse = false;
        }
    }

    /// Paint `text` into row `y`, clipped to the screen width.
    ///
    /// Reverse-video rows are padded with spaces to the full width so the
    /// bar spans the terminal. Out-of-range rows are ignored.
    pub fn put_line(&mut self, y: u16, text: &str, inverse: bool) {
        let width = usize::from(self.cols);
        let Some(row) = self.back.get_mut(usize::from(y)) else {
            return;
        };

        row.text.clear();
        row.text.extend(text.chars().take(width));
        if inverse {
            let len = row.text.chars().count();
            row.text.extend(std::iter::repeat_n(' ', width - len));
        }
        row.inverse = inverse;
    }

    /// The painted back-frame row at `y`.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&Row> {
        self.back.get(usize::from(y))
    }

    /// Write changed rows to `w` and remember them as the terminal state.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `w`.
    pub fn render(&mut self, w: &mut impl Write) -> io::Result<usize> {
        let dirty: Vec<usize> = (0..self.back.len())
            .filter(|&y| self.front[y].as_ref() != Some(&self.back[y]))
            .collect();

        if dirty.is_empty() {
            return Ok(0);
        }

        ansi::begin_sync(w)?;
        ansi::cursor_hide(w)?;
        for &y in &dirty {
            let row = &self.back[y];
            #[allow(clippy::cast_possible_truncation)] // y < rows, which is u16.
            ansi::cursor_to(w, 0, y as u16)?;
            if row.inverse {
                ansi::reverse(w)?;
            }
            w.write_all(row.text.as_bytes())?;
            ansi::clear_to_eol(w)?;
            if row.inverse {
                ansi::reset(w)?;
            }
            self.front[y] = Some(row.clone());
        }
        ansi::end_sync(w)?;

        Ok(dirty.len())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
