//! Viewport: the visible window over the document.
//!
//! Holds the text area size (terminal height minus the status and message
//! rows) and the scroll offsets. [`scroll_to_cursor`](Viewport::scroll_to_cursor)
//! is the one place scroll offsets are corrected after the cursor moves:
//!
//! - cursor above the window: `row_offset = row`
//! - cursor below the window: `row_offset = row - rows + 1`
//! - `row_offset` never exceeds `max(0, line_count - rows)`, so a document
//!   shorter than the window is always shown from the top
//!
//! Columns follow the same rule against `col_offset` and `cols`.

use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    rows: usize,
    cols: usize,
    row_offset: usize,
    col_offset: usize,
}

impl Viewport {
    /// A viewport of `rows` × `cols` text cells, scrolled to the origin.
    /// Both dimensions are at least 1.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            row_offset: 0,
            col_offset: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Cursor position relative to the top-left visible cell, if visible.
    #[must_use]
    pub const fn screen_position(&self, pos: Position) -> Option<(usize, usize)> {
        if pos.row < self.row_offset
            || pos.row >= self.row_offset + self.rows
            || pos.col < self.col_offset
            || pos.col >= self.col_offset + self.cols
        {
            return None;
        }
        Some((pos.col - self.col_offset, pos.row - self.row_offset))
    }

    // -- Updates ------------------------------------------------------------

    /// Change the size. Offsets are corrected on the next scroll step.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
    }

    /// Back to the top-left corner.
    pub const fn reset(&mut self) {
        self.row_offset = 0;
        self.col_offset = 0;
    }

    pub const fn reset_horizontal(&mut self) {
        self.col_offset = 0;
    }

    /// Adjust the offsets so `pos` is inside the window.
    pub fn scroll_to_cursor(&mut self, pos: Position, line_count: usize) {
        self.row_offset = follow(self.row_offset, pos.row, self.rows);
        self.row_offset = self.row_offset.min(self.max_row_offset(line_count));
        self.col_offset = follow(self.col_offset, pos.col, self.cols);
    }

    /// Scroll one page down and return the cursor row moved by the same
    /// amount, both clamped to the document.
    pub fn page_down(&mut self, row: usize, line_count: usize) -> usize {
        self.row_offset = (self.row_offset + self.rows).min(self.max_row_offset(line_count));
        (row + self.rows).min(line_count.saturating_sub(1))
    }

    /// Scroll one page up and return the cursor row moved by the same amount.
    pub const fn page_up(&mut self, row: usize) -> usize {
        self.row_offset = self.row_offset.saturating_sub(self.rows);
        row.saturating_sub(self.rows)
    }

    const fn max_row_offset(&self, line_count: usize) -> usize {
        line_count.saturating_sub(self.rows)
    }
}

/// The smallest change to `offset` that puts `at` inside `[offset, offset + size)`.
const fn follow(offset: usize, at: usize, size: usize) -> usize {
    if at < offset {
        at
    } else if at >= offset + size {
        at + 1 - size
    } else {
        offset
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
