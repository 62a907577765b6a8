//! Session: the editing state every intent goes through.
//!
//! A `Session` owns the document, the cursor and the viewport. Each public
//! operation changes the document and/or the cursor and then calls
//! [`settle`](Session::settle), which clamps the cursor into the document
//! and scrolls the viewport so the cursor is visible. No operation adjusts
//! scroll offsets on its own, so the visibility invariant holds after every
//! call:
//!
//! ```text
//! 0 <= row < line_count
//! 0 <= col <= len(line[row])
//! row_offset <= row < row_offset + viewport_rows
//! ```
//!
//! Edits are refused with [`Error::ReadOnly`] while the document is
//! read-only. Motions and saving are always allowed.

use std::path::{Path, PathBuf};

use crate::cursor::Cursor;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::position::Position;
use crate::viewport::Viewport;

/// Spaces inserted by Tab unless configured otherwise.
pub const DEFAULT_TAB_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct Session {
    doc: Document,
    cursor: Cursor,
    view: Viewport,
    tab_width: usize,
}

impl Session {
    /// An empty, unnamed document in a `rows` × `cols` text area.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_document(Document::new(), rows, cols)
    }

    /// Wrap an existing document, cursor at the origin.
    #[must_use]
    pub fn with_document(doc: Document, rows: usize, cols: usize) -> Self {
        Self {
            doc,
            cursor: Cursor::new(),
            view: Viewport::new(rows, cols),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor.position()
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.view
    }

    #[inline]
    #[must_use]
    pub const fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Set how many spaces Tab inserts (at least 1).
    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width.max(1);
    }

    /// Place the cursor at `pos`, clamped into the document.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor.set_position(pos, &self.doc);
        self.settle();
    }

    /// New text area size after a terminal resize.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.view.resize(rows, cols);
        self.settle();
    }

    // -- Motions ------------------------------------------------------------

    pub fn move_left(&mut self) {
        self.cursor.move_left(&self.doc);
        self.settle();
    }

    pub fn move_right(&mut self) {
        self.cursor.move_right(&self.doc);
        self.settle();
    }

    pub fn move_up(&mut self) {
        self.cursor.move_up(&self.doc);
        self.settle();
    }

    pub fn move_down(&mut self) {
        self.cursor.move_down(&self.doc);
        self.settle();
    }

    /// Column 0, also scrolling back to the first column.
    pub fn line_start(&mut self) {
        self.cursor.move_to_line_start();
        self.view.reset_horizontal();
        self.settle();
    }

    pub fn line_end(&mut self) {
        self.cursor.move_to_line_end(&self.doc);
        self.settle();
    }

    pub fn forward_word(&mut self) {
        self.cursor.forward_word(&self.doc);
        self.settle();
    }

    pub fn backward_word(&mut self) {
        self.cursor.backward_word(&self.doc);
        self.settle();
    }

    /// Scroll a page down, moving the cursor by the same number of rows.
    pub fn page_down(&mut self) {
        let pos = self.cursor.position();
        let row = self.view.page_down(pos.row, self.doc.line_count());
        self.cursor.set_position(Position::new(row, pos.col), &self.doc);
        self.settle();
    }

    /// Scroll a page up, moving the cursor by the same number of rows.
    pub fn page_up(&mut self) {
        let pos = self.cursor.position();
        let row = self.view.page_up(pos.row);
        self.cursor.set_position(Position::new(row, pos.col), &self.doc);
        self.settle();
    }

    // -- Edits --------------------------------------------------------------

    /// Insert one byte at the cursor and step past it. `\n` and `\r` split
    /// the line instead, since lines never hold terminators.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnly`] if the document is read-only.
    pub fn insert_char(&mut self, byte: u8) -> Result<()> {
        if byte == b'\n' || byte == b'\r' {
            return self.split_line();
        }
        self.check_writable()?;

        let Position { row, col } = self.cursor.position();
        self.doc.insert_byte(row, col, byte);
        self.cursor.set_position(Position::new(row, col + 1), &self.doc);
        self.settle();
        Ok(())
    }

    /// Insert `tab_width` spaces at the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnly`] if the document is read-only.
    pub fn insert_tab(&mut self) -> Result<()> {
        self.check_writable()?;

        let Position { row, col } = self.cursor.position();
        let spaces = vec![b' '; self.tab_width];
        self.doc.insert_bytes(row, col, &spaces);
        self.cursor
            .set_position(Position::new(row, col + self.tab_width), &self.doc);
        self.settle();
        Ok(())
    }

    /// Delete the byte before the cursor. At column 0 the current line is
    /// joined onto the previous one and the cursor lands on the join point.
    /// At the very start of the document nothing happens.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnly`] if the document is read-only.
    pub fn backspace(&mut self) -> Result<()> {
        self.check_writable()?;

        let Position { row, col } = self.cursor.position();
        if col > 0 {
            self.doc.remove_byte(row, col - 1);
            self.cursor.set_position(Position::new(row, col - 1), &self.doc);
        } else if row > 0 {
            if let Some(at) = self.doc.join_lines(row - 1) {
                self.cursor.set_position(Position::new(row - 1, at), &self.doc);
            }
        }
        self.settle();
        Ok(())
    }

    /// Split the line at the cursor; the cursor moves to the start of the new
    /// line holding the right-hand part.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnly`] if the document is read-only.
    pub fn split_line(&mut self) -> Result<()> {
        self.check_writable()?;

        let Position { row, col } = self.cursor.position();
        self.doc.split_line(row, col);
        self.cursor.set_position(Position::new(row + 1, 0), &self.doc);
        self.settle();
        Ok(())
    }

    /// Empty the document, keeping its path.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnly`] if the document is read-only.
    pub fn clear(&mut self) -> Result<()> {
        self.check_writable()?;

        self.doc.clear();
        self.cursor = Cursor::new();
        self.view.reset();
        self.settle();
        Ok(())
    }

    // -- Files --------------------------------------------------------------

    /// Replace the document with the file at `path` and go to the top.
    ///
    /// The read-only flag carries over to the new contents.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file cannot be read; the session is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.doc.load(path)?;
        self.cursor = Cursor::new();
        self.view.reset();
        self.settle();
        Ok(())
    }

    /// Write the document to `path`, which becomes its path.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] if the file cannot be written.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.doc.save(path)
    }

    /// Write the document to its own path.
    ///
    /// # Errors
    ///
    /// [`Error::NoPath`] without a path, otherwise as [`save`](Self::save).
    pub fn save_current(&mut self) -> Result<()> {
        self.doc.save_current()
    }

    /// Name the document without touching the disk.
    pub fn set_path(&mut self, path: PathBuf) {
        self.doc.set_path(path);
    }

    pub const fn set_readonly(&mut self, readonly: bool) {
        self.doc.set_readonly(readonly);
    }

    /// Flip the read-only flag and return the new value.
    pub const fn toggle_readonly(&mut self) -> bool {
        let readonly = !self.doc.is_readonly();
        self.doc.set_readonly(readonly);
        readonly
    }

    // -- Internals ----------------------------------------------------------

    fn check_writable(&self) -> Result<()> {
        if self.doc.is_readonly() {
            tracing::warn!("edit rejected: buffer is read-only");
            return Err(Error::ReadOnly);
        }
        Ok(())
    }

    /// Clamp the cursor into the document and scroll it into view.
    fn settle(&mut self) {
        self.cursor.clamp(&self.doc);
        self.view
            .scroll_to_cursor(self.cursor.position(), self.doc.line_count());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn session(text: &str, rows: usize) -> Session {
        Session::with_document(Document::from_bytes(text.as_bytes()), rows, 80)
    }

    fn lines(s: &Session) -> Vec<String> {
        s.document()
            .lines()
            .iter()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect()
    }

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    fn assert_invariants(s: &Session) {
        let doc = s.document();
        let pos = s.cursor();
        let view = s.viewport();
        assert!(doc.line_count() >= 1);
        assert!(pos.row < doc.line_count(), "row {} out of range", pos.row);
        assert!(pos.col <= doc.line_len(pos.row), "col {} past line end", pos.col);
        assert!(view.row_offset() <= pos.row);
        assert!(pos.row < view.row_offset() + view.rows());
        if doc.line_count() < view.rows() {
            assert_eq!(view.row_offset(), 0);
        }
        for line in doc.lines().iter() {
            assert!(!line.contains(&b'\n') && !line.contains(&b'\r'));
        }
    }

    // -- Scenarios ----------------------------------------------------------

    #[test]
    fn type_into_new_document() {
        let mut s = Session::new(10, 80);
        for b in b"hello" {
            s.insert_char(*b).unwrap();
        }
        assert_eq!(lines(&s), vec!["hello"]);
        assert_eq!(s.cursor(), p(0, 5));
        assert!(s.document().is_modified());
    }

    #[test]
    fn right_at_line_end_goes_to_next_line() {
        let mut s = session("ab\ncd", 10);
        s.set_cursor(p(0, 2));
        s.move_right();
        assert_eq!(s.cursor(), p(1, 0));
    }

    #[test]
    fn backspace_at_line_start_joins() {
        let mut s = session("ab\ncd", 10);
        s.set_cursor(p(1, 0));
        s.backspace().unwrap();
        assert_eq!(lines(&s), vec!["abcd"]);
        assert_eq!(s.cursor(), p(0, 2));
    }

    #[test]
    fn enter_splits_line() {
        let mut s = session("abc\n\n", 10);
        assert_eq!(lines(&s), vec!["abc", ""]);
        s.set_cursor(p(0, 1));
        s.split_line().unwrap();
        assert_eq!(lines(&s), vec!["a", "bc", ""]);
        assert_eq!(s.cursor(), p(1, 0));
    }

    #[test]
    fn load_crlf_and_save_lf() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("crlf.txt");
        let dst = dir.path().join("lf.txt");
        fs::write(&src, "x\r\ny\n").unwrap();

        let mut s = Session::new(10, 80);
        s.load(&src).unwrap();
        assert_eq!(lines(&s), vec!["x", "y"]);
        s.save(&dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"x\ny");
    }

    // -- Edits --------------------------------------------------------------

    #[test]
    fn backspace_within_line() {
        let mut s = session("abc", 10);
        s.set_cursor(p(0, 2));
        s.backspace().unwrap();
        assert_eq!(lines(&s), vec!["ac"]);
        assert_eq!(s.cursor(), p(0, 1));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut s = session("abc", 10);
        s.backspace().unwrap();
        assert_eq!(lines(&s), vec!["abc"]);
        assert_eq!(s.cursor(), p(0, 0));
        assert!(!s.document().is_modified());
    }

    #[test]
    fn enter_at_line_end_opens_empty_line() {
        let mut s = session("abc", 10);
        s.line_end();
        s.split_line().unwrap();
        assert_eq!(lines(&s), vec!["abc", ""]);
        assert_eq!(s.cursor(), p(1, 0));
    }

    #[test]
    fn newline_byte_splits() {
        let mut s = session("ab", 10);
        s.set_cursor(p(0, 1));
        s.insert_char(b'\n').unwrap();
        s.insert_char(b'\r').unwrap();
        assert_eq!(lines(&s), vec!["a", "", "b"]);
        assert_eq!(s.cursor(), p(2, 0));
    }

    #[test]
    fn tab_inserts_spaces() {
        let mut s = session("x", 10);
        s.insert_tab().unwrap();
        assert_eq!(lines(&s), vec!["    x"]);
        assert_eq!(s.cursor(), p(0, 4));

        s.set_tab_width(2);
        s.insert_tab().unwrap();
        assert_eq!(lines(&s), vec!["      x"]);
        assert_eq!(s.cursor(), p(0, 6));

        s.set_tab_width(0);
        assert_eq!(s.tab_width(), 1);
    }

    #[test]
    fn clear_resets_cursor_and_scroll() {
        let mut s = session(&numbered(50), 10);
        s.set_cursor(p(40, 3));
        s.clear().unwrap();
        assert_eq!(lines(&s), vec![""]);
        assert_eq!(s.cursor(), p(0, 0));
        assert_eq!(s.viewport().row_offset(), 0);
    }

    // -- Read-only ----------------------------------------------------------

    #[test]
    fn readonly_rejects_edits() {
        let mut s = session("ab\ncd", 10);
        s.set_readonly(true);
        s.set_cursor(p(1, 0));

        assert!(matches!(s.insert_char(b'x'), Err(Error::ReadOnly)));
        assert!(matches!(s.insert_tab(), Err(Error::ReadOnly)));
        assert!(matches!(s.backspace(), Err(Error::ReadOnly)));
        assert!(matches!(s.split_line(), Err(Error::ReadOnly)));
        assert!(matches!(s.insert_char(b'\n'), Err(Error::ReadOnly)));
        assert!(matches!(s.clear(), Err(Error::ReadOnly)));

        assert_eq!(lines(&s), vec!["ab", "cd"]);
        assert_eq!(s.cursor(), p(1, 0));
        assert!(!s.document().is_modified());
    }

    #[test]
    fn readonly_still_allows_motion_and_toggle() {
        let mut s = session("ab\ncd", 10);
        s.set_readonly(true);
        s.move_down();
        s.line_end();
        assert_eq!(s.cursor(), p(1, 2));
        assert!(!s.toggle_readonly());
        s.insert_char(b'!').unwrap();
        assert_eq!(lines(&s), vec!["ab", "cd!"]);
    }

    // -- Scrolling ----------------------------------------------------------

    #[test]
    fn moving_down_scrolls_one_line_at_a_time() {
        let mut s = session(&numbered(20), 5);
        for _ in 0..5 {
            s.move_down();
        }
        assert_eq!(s.cursor(), p(5, 0));
        assert_eq!(s.viewport().row_offset(), 1);
    }

    #[test]
    fn moving_up_reveals_row_above() {
        let mut s = session(&numbered(20), 5);
        s.set_cursor(p(10, 0));
        assert_eq!(s.viewport().row_offset(), 6);
        for _ in 0..5 {
            s.move_up();
        }
        assert_eq!(s.viewport().row_offset(), 5);
    }

    #[test]
    fn left_across_top_edge_scrolls_up() {
        let mut s = session(&numbered(20), 5);
        s.set_cursor(p(10, 0));
        s.page_up();
        let top = s.viewport().row_offset();
        s.set_cursor(p(top, 0));
        s.move_left();
        assert_eq!(s.cursor().row, top - 1);
        assert_eq!(s.viewport().row_offset(), top - 1);
    }

    #[test]
    fn enter_on_last_visible_row_scrolls() {
        let mut s = session(&numbered(5), 5);
        s.set_cursor(p(4, 0));
        s.split_line().unwrap();
        assert_eq!(s.cursor(), p(5, 0));
        assert_eq!(s.viewport().row_offset(), 1);
    }

    #[test]
    fn page_down_then_up() {
        let mut s = session(&numbered(100), 10);
        s.set_cursor(p(3, 2));
        s.page_down();
        assert_eq!(s.cursor(), p(13, 2));
        assert_eq!(s.viewport().row_offset(), 10);
        s.page_up();
        assert_eq!(s.cursor(), p(3, 2));
        assert_eq!(s.viewport().row_offset(), 0);
    }

    #[test]
    fn page_down_clamps_row_and_column() {
        let mut s = session("a long first line\nb\nc", 10);
        s.set_cursor(p(0, 10));
        s.page_down();
        assert_eq!(s.cursor(), p(2, 1));
        assert_eq!(s.viewport().row_offset(), 0);
    }

    #[test]
    fn line_start_resets_horizontal_scroll() {
        let long = "x".repeat(200);
        let mut s = Session::with_document(Document::from_bytes(long.as_bytes()), 5, 40);
        s.line_end();
        assert_eq!(s.viewport().col_offset(), 161);
        s.line_start();
        assert_eq!(s.viewport().col_offset(), 0);
        assert_eq!(s.cursor(), p(0, 0));
    }

    #[test]
    fn resize_keeps_cursor_visible() {
        let mut s = session(&numbered(50), 20);
        s.set_cursor(p(19, 0));
        assert_eq!(s.viewport().row_offset(), 0);
        s.resize(5, 80);
        assert_eq!(s.viewport().row_offset(), 15);
        assert_invariants(&s);
    }

    // -- Files --------------------------------------------------------------

    #[test]
    fn load_resets_cursor_and_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "one\ntwo").unwrap();

        let mut s = session(&numbered(50), 5);
        s.set_cursor(p(30, 4));
        s.load(&path).unwrap();
        assert_eq!(s.cursor(), p(0, 0));
        assert_eq!(s.viewport().row_offset(), 0);
        assert_eq!(s.document().path(), Some(path.as_path()));
    }

    #[test]
    fn failed_load_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&numbered(50), 5);
        s.set_cursor(p(30, 4));
        assert!(s.load(&dir.path().join("nope")).is_err());
        assert_eq!(s.cursor(), p(30, 4));
        assert_eq!(s.document().line_count(), 50);
    }

    #[test]
    fn save_current_needs_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Session::new(5, 80);
        s.insert_char(b'z').unwrap();
        assert!(matches!(s.save_current(), Err(Error::NoPath)));

        let path = dir.path().join("z.txt");
        s.set_path(path.clone());
        s.save_current().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"z");
        assert!(!s.document().is_modified());
    }

    // -- Invariants under random operation sequences ------------------------

    /// Small deterministic generator so failures reproduce.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            self.0 >> 33
        }
    }

    fn apply(s: &mut Session, op: u64) {
        match op % 14 {
            0 => s.move_left(),
            1 => s.move_right(),
            2 => s.move_up(),
            3 => s.move_down(),
            4 => s.line_start(),
            5 => s.line_end(),
            6 => s.forward_word(),
            7 => s.backward_word(),
            8 => s.page_down(),
            9 => s.page_up(),
            10 => s.split_line().unwrap(),
            11 => s.backspace().unwrap(),
            12 => s.insert_tab().unwrap(),
            _ => s.insert_char(b"ab _.z9"[(op / 14 % 7) as usize]).unwrap(),
        }
    }

    #[test]
    fn invariants_hold_for_random_sequences() {
        for seed in 0..20 {
            let mut rng = Lcg(seed);
            let mut s = session("fn main() {\n    let x = 1;\n}\n\nend", 4);
            for _ in 0..500 {
                apply(&mut s, rng.next());
                assert_invariants(&s);
            }
        }
    }

    #[test]
    fn invariants_hold_when_deleting_everything() {
        let mut s = session(&numbered(12), 3);
        s.page_down();
        s.page_down();
        s.page_down();
        s.page_down();
        s.line_end();
        while s.cursor() != Position::ZERO {
            s.backspace().unwrap();
            assert_invariants(&s);
        }
        assert_eq!(lines(&s), vec![""]);
        assert_eq!(s.document().line_count(), 1);
    }
}
