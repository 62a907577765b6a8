//! Cursor: a position with movement primitives.
//!
//! The cursor doesn't own the document; each movement takes it as a
//! parameter and keeps the position inside it: `row` in
//! `[0, line_count)` and `col` in `[0, len(line[row])]`.
//!
//! Horizontal motions wrap across line boundaries the Emacs way: Right at
//! the end of a line goes to the start of the next one, Left at column 0
//! goes to the end of the previous one. Vertical motions clamp the column
//! to the new line's length. Scrolling is not handled here; the session
//! runs the viewport's scroll step after every motion.

use crate::document::Document;
use crate::position::Position;
use crate::word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
        }
    }

    /// A cursor at `pos`, clamped into `doc`.
    #[must_use]
    pub fn at(pos: Position, doc: &Document) -> Self {
        Self {
            pos: clamp(pos, doc),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.pos.row
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    // -- Direct positioning -------------------------------------------------

    /// Move to `pos`, clamped into `doc`.
    pub fn set_position(&mut self, pos: Position, doc: &Document) {
        self.pos = clamp(pos, doc);
    }

    /// Re-clamp after the document changed shape underneath the cursor.
    pub fn clamp(&mut self, doc: &Document) {
        self.pos = clamp(self.pos, doc);
    }

    // -- Character motions --------------------------------------------------

    /// One byte left, or to the end of the previous line from column 0.
    pub fn move_left(&mut self, doc: &Document) {
        if self.pos.col > 0 {
            self.pos.col -= 1;
        } else if self.pos.row > 0 {
            self.pos.row -= 1;
            self.pos.col = doc.line_len(self.pos.row);
        }
    }

    /// One byte right, or to the start of the next line from the line end.
    pub fn move_right(&mut self, doc: &Document) {
        if self.pos.col < doc.line_len(self.pos.row) {
            self.pos.col += 1;
        } else if self.pos.row + 1 < doc.line_count() {
            self.pos.row += 1;
            self.pos.col = 0;
        }
    }

    /// One line up, clamping the column.
    pub fn move_up(&mut self, doc: &Document) {
        if self.pos.row > 0 {
            self.pos.row -= 1;
            self.pos.col = self.pos.col.min(doc.line_len(self.pos.row));
        }
    }

    /// One line down, clamping the column.
    pub fn move_down(&mut self, doc: &Document) {
        if self.pos.row + 1 < doc.line_count() {
            self.pos.row += 1;
            self.pos.col = self.pos.col.min(doc.line_len(self.pos.row));
        }
    }

    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
    }

    pub fn move_to_line_end(&mut self, doc: &Document) {
        self.pos.col = doc.line_len(self.pos.row);
    }

    // -- Word motions -------------------------------------------------------

    /// Forward to the start of the next word.
    ///
    /// From the end of a line, or when no word follows on this line, the
    /// cursor continues at the start of the next line. On the last line it
    /// stops at the line end.
    pub fn forward_word(&mut self, doc: &Document) {
        let line = doc.line(self.pos.row).unwrap_or_default();
        let len = line.len();

        if self.pos.col < len {
            self.pos.col = word::forward_word(line, self.pos.col);
            if self.pos.col < len {
                return;
            }
        }

        if self.pos.row + 1 < doc.line_count() {
            self.pos.row += 1;
            self.pos.col = 0;
        } else {
            self.pos.col = len;
        }
    }

    /// Back to the start of the previous word. From column 0 this moves to
    /// the end of the previous line, like Left.
    pub fn backward_word(&mut self, doc: &Document) {
        if self.pos.col == 0 {
            self.move_left(doc);
            return;
        }
        let line = doc.line(self.pos.row).unwrap_or_default();
        self.pos.col = word::backward_word(line, self.pos.col);
    }
}

/// Clamp `pos` to an existing row and a column within that row.
#[must_use]
pub fn clamp(pos: Position, doc: &Document) -> Position {
    let row = pos.row.min(doc.line_count() - 1);
    let col = pos.col.min(doc.line_len(row));
    Position { row, col }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_bytes(text.as_bytes())
    }

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn cursor(d: &Document, row: usize, col: usize) -> Cursor {
        Cursor::at(p(row, col), d)
    }

    // -- Clamping -----------------------------------------------------------

    #[test]
    fn at_clamps_into_document() {
        let d = doc("abc\nde");
        assert_eq!(cursor(&d, 0, 99).position(), p(0, 3));
        assert_eq!(cursor(&d, 9, 9).position(), p(1, 2));
        assert_eq!(Cursor::new().position(), Position::ZERO);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut d = doc("abcdef\nx");
        let mut c = cursor(&d, 1, 1);
        d.delete_line(1);
        c.clamp(&d);
        assert_eq!(c.position(), p(0, 1));

        c.set_position(p(0, 6), &d);
        d.replace_line(0, b"ab");
        c.clamp(&d);
        assert_eq!(c.position(), p(0, 2));
    }

    // -- Left / Right -------------------------------------------------------

    #[test]
    fn right_wraps_to_next_line() {
        let d = doc("ab\ncd");
        let mut c = cursor(&d, 0, 2);
        c.move_right(&d);
        assert_eq!(c.position(), p(1, 0));
    }

    #[test]
    fn right_stops_at_document_end() {
        let d = doc("ab\ncd");
        let mut c = cursor(&d, 1, 2);
        c.move_right(&d);
        assert_eq!(c.position(), p(1, 2));
    }

    #[test]
    fn left_wraps_to_previous_line_end() {
        let d = doc("abc\nd");
        let mut c = cursor(&d, 1, 0);
        c.move_left(&d);
        assert_eq!(c.position(), p(0, 3));
    }

    #[test]
    fn left_stops_at_origin() {
        let d = doc("abc");
        let mut c = Cursor::new();
        c.move_left(&d);
        assert_eq!(c.position(), Position::ZERO);
    }

    // -- Up / Down ----------------------------------------------------------

    #[test]
    fn vertical_moves_clamp_column() {
        let d = doc("long line\nab\nanother line");
        let mut c = cursor(&d, 0, 8);
        c.move_down(&d);
        assert_eq!(c.position(), p(1, 2));
        c.move_down(&d);
        assert_eq!(c.position(), p(2, 2));
        c.move_up(&d);
        c.move_up(&d);
        assert_eq!(c.position(), p(0, 2));
        c.move_up(&d);
        assert_eq!(c.position(), p(0, 2));
    }

    #[test]
    fn down_on_last_line_is_noop() {
        let d = doc("a\nb");
        let mut c = cursor(&d, 1, 1);
        c.move_down(&d);
        assert_eq!(c.position(), p(1, 1));
    }

    // -- Line start / end ---------------------------------------------------

    #[test]
    fn line_start_and_end() {
        let d = doc("hello");
        let mut c = cursor(&d, 0, 2);
        c.move_to_line_end(&d);
        assert_eq!(c.col(), 5);
        c.move_to_line_start();
        assert_eq!(c.col(), 0);
    }

    // -- Words --------------------------------------------------------------

    #[test]
    fn forward_word_within_line() {
        let d = doc("foo bar baz");
        let mut c = Cursor::new();
        c.forward_word(&d);
        assert_eq!(c.position(), p(0, 4));
        c.forward_word(&d);
        assert_eq!(c.position(), p(0, 8));
    }

    #[test]
    fn forward_word_from_last_word_wraps() {
        let d = doc("foo bar\nnext");
        let mut c = cursor(&d, 0, 4);
        c.forward_word(&d);
        assert_eq!(c.position(), p(1, 0));
    }

    #[test]
    fn forward_word_at_line_end_wraps() {
        let d = doc("foo\nnext");
        let mut c = cursor(&d, 0, 3);
        c.forward_word(&d);
        assert_eq!(c.position(), p(1, 0));
    }

    #[test]
    fn forward_word_on_last_line_stops_at_end() {
        let d = doc("foo bar");
        let mut c = cursor(&d, 0, 4);
        c.forward_word(&d);
        assert_eq!(c.position(), p(0, 7));
        c.forward_word(&d);
        assert_eq!(c.position(), p(0, 7));
    }

    #[test]
    fn backward_word_within_line() {
        let d = doc("foo bar");
        let mut c = cursor(&d, 0, 7);
        c.backward_word(&d);
        assert_eq!(c.position(), p(0, 4));
        c.backward_word(&d);
        assert_eq!(c.position(), p(0, 0));
    }

    #[test]
    fn backward_word_at_line_start_acts_like_left() {
        let d = doc("foo\nbar");
        let mut c = cursor(&d, 1, 0);
        c.backward_word(&d);
        assert_eq!(c.position(), p(0, 3));
    }
}
