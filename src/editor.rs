// SPDX-License-Identifier: MIT
//
// The editor application: wires the editing session to the event loop.
//
// Every key goes through one of two paths. With a minibuffer prompt open
// the key edits the prompt; otherwise the keymap resolves it to a command
// that runs against the session. Commands that need a file name or an
// answer open a prompt and finish when it is submitted.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status line (reverse video)  │  ← 1 row
//   ├──────────────────────────────┤
//   │ minibuffer / message line    │  ← 1 row
//   └──────────────────────────────┘

use std::path::{Path, PathBuf};

use qm_editor::Error;
use qm_editor::complete::{self, Completion};
use qm_editor::keymap::{self, Command, Keymap, Resolved};
use qm_editor::minibuffer::{Minibuffer, Outcome};
use qm_editor::session::Session;
use qm_editor::settings::Settings;

use qm_term::event_loop::{Action, App};
use qm_term::input::KeyEvent;
use qm_term::screen::Screen;
use qm_term::terminal::Size;

/// Rows taken by the status and message lines.
const RESERVED_ROWS: u16 = 2;

// ─── Prompts ────────────────────────────────────────────────────────────────

/// What a submitted prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    SaveAs,
    WriteFile,
    OpenFile,
    ConfirmExit,
    ExitSaveAs,
    RunCommand,
}

impl PromptKind {
    const fn label(self) -> &'static str {
        match self {
            Self::SaveAs | Self::ExitSaveAs => "Save as: ",
            Self::WriteFile => "Write file: ",
            Self::OpenFile => "Open file: ",
            Self::ConfirmExit => "Modified; save before exit? (y/N) ",
            Self::RunCommand => "M-x ",
        }
    }

    const fn canceled(self) -> &'static str {
        match self {
            Self::SaveAs => "Save canceled",
            Self::WriteFile => "Write canceled",
            Self::OpenFile => "Open canceled",
            Self::ConfirmExit | Self::ExitSaveAs => "Exit canceled",
            Self::RunCommand => "Command canceled",
        }
    }

    const fn takes_path(self) -> bool {
        matches!(
            self,
            Self::SaveAs | Self::WriteFile | Self::OpenFile | Self::ExitSaveAs
        )
    }
}

struct Prompt {
    kind: PromptKind,
    minibuffer: Minibuffer,
    /// Candidate list from the last Tab, shown after the input until the
    /// next key.
    hint: Option<String>,
}

// ─── Editor ─────────────────────────────────────────────────────────────────

pub struct Editor {
    session: Session,
    keymap: Keymap,
    prompt: Option<Prompt>,
    message: Option<String>,
    /// Terminal size as of the last paint or resize.
    size: Size,
    quit: bool,
}

impl Editor {
    /// An editor for a terminal of `size`, with the document from `file`
    /// when given.
    ///
    /// A file that can't be loaded starts an empty document with that
    /// name, saved on the first `C-x C-s`.
    pub fn new(size: Size, file: Option<&Path>, settings: &Settings) -> Self {
        let (rows, cols) = text_area(size);
        let mut session = Session::new(rows, cols);
        session.set_tab_width(settings.tab_width);

        let message = match file {
            None => "Welcome!".to_string(),
            Some(path) => match session.load(path) {
                Ok(()) => format!("Opened {}", path.display()),
                Err(err) => {
                    tracing::info!(path = %path.display(), error = %err, "starting new file");
                    session.set_path(path.to_path_buf());
                    format!("New file: {}", path.display())
                }
            },
        };
        session.set_readonly(settings.read_only);

        Self {
            session,
            keymap: Keymap::new(),
            prompt: None,
            message: Some(message),
            size,
            quit: false,
        }
    }

    // ── Messages ──────────────────────────────────────────────────────

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    // ── Key dispatch ──────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        match self.keymap.resolve(key) {
            Resolved::Command(command) => self.run(command),
            Resolved::UnknownPrefix => self.set_message("Unknown C-x sequence"),
            Resolved::Prefix | Resolved::Unbound => {}
        }
    }

    fn run(&mut self, command: Command) {
        tracing::debug!(?command, "run");
        match command {
            Command::ForwardChar => self.session.move_right(),
            Command::BackwardChar => self.session.move_left(),
            Command::NextLine => self.session.move_down(),
            Command::PreviousLine => self.session.move_up(),
            Command::LineStart => self.session.line_start(),
            Command::LineEnd => self.session.line_end(),
            Command::ForwardWord => self.session.forward_word(),
            Command::BackwardWord => self.session.backward_word(),
            Command::PageDown => self.session.page_down(),
            Command::PageUp => self.session.page_up(),
            Command::DeleteBackward => self.edit(Session::backspace),
            Command::Newline => self.edit(Session::split_line),
            Command::InsertTab => self.edit(Session::insert_tab),
            Command::SelfInsert(byte) => self.edit(|s| s.insert_char(byte)),
            Command::Save => self.save(),
            Command::WriteFile => self.open_prompt(PromptKind::WriteFile),
            Command::FindFile => self.open_prompt(PromptKind::OpenFile),
            Command::ToggleReadOnly => {
                let msg = if self.session.toggle_readonly() {
                    "Read-only mode enabled"
                } else {
                    "Read-only mode disabled"
                };
                self.set_message(msg);
            }
            Command::Exit => {
                if self.session.document().is_modified() {
                    self.open_prompt(PromptKind::ConfirmExit);
                } else {
                    self.quit = true;
                }
            }
            Command::ExecuteCommand => self.open_prompt(PromptKind::RunCommand),
            Command::Cancel => {
                self.keymap.reset();
                self.clear_message();
            }
            Command::Help => self.set_message(keymap::HELP),
        }
    }

    fn edit(&mut self, f: impl FnOnce(&mut Session) -> qm_editor::Result<()>) {
        if let Err(err) = f(&mut self.session) {
            self.report(&err);
        }
    }

    fn report(&mut self, err: &Error) {
        let msg = match err {
            Error::ReadOnly => "Buffer is read-only".to_string(),
            other => other.to_string(),
        };
        self.set_message(msg);
    }

    // ── Files ─────────────────────────────────────────────────────────

    /// Save to the document's path, or ask for one.
    fn save(&mut self) {
        if self.session.document().path().is_none() {
            self.open_prompt(PromptKind::SaveAs);
            return;
        }
        if let Err(err) = self.session.save_current() {
            self.set_message(format!("Save failed: {err}"));
            return;
        }
        if let Some(path) = self.session.document().path() {
            let msg = format!("Saved '{}'", path.display());
            self.set_message(msg);
        }
    }

    /// Save to `input`. Returns whether the file was written.
    fn save_to(&mut self, input: &str) -> bool {
        let path = complete::expand_tilde(input);
        match self.session.save(&path) {
            Ok(()) => {
                self.set_message(format!("Saved '{input}'"));
                true
            }
            Err(err) => {
                self.set_message(format!("Save failed: {err}"));
                false
            }
        }
    }

    fn open(&mut self, input: &str) {
        let path: PathBuf = complete::expand_tilde(input);
        match self.session.load(&path) {
            Ok(()) => self.set_message(format!("Opened '{input}'")),
            Err(err) => self.set_message(format!("Open failed: {err}")),
        }
    }

    // ── Prompts ───────────────────────────────────────────────────────

    fn open_prompt(&mut self, kind: PromptKind) {
        self.clear_message();
        self.prompt = Some(Prompt {
            kind,
            minibuffer: Minibuffer::new(kind.label()),
            hint: None,
        });
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        prompt.hint = None;

        match prompt.minibuffer.handle_key(key) {
            Outcome::Pending => {}
            Outcome::Complete => {
                let input = prompt.minibuffer.input();
                let completion = match prompt.kind {
                    PromptKind::RunCommand => complete::complete_command(input),
                    kind if kind.takes_path() => complete::complete_path(input),
                    _ => return,
                };
                prompt.hint = Some(hint_for(&completion));
                prompt.minibuffer.set_input(completion.input);
            }
            Outcome::Cancel => {
                let kind = prompt.kind;
                self.prompt = None;
                self.set_message(kind.canceled());
            }
            Outcome::Submit(input) => {
                let kind = prompt.kind;
                self.prompt = None;
                self.submit(kind, input.trim());
            }
        }
    }

    fn submit(&mut self, kind: PromptKind, input: &str) {
        if input.is_empty() && kind != PromptKind::ConfirmExit {
            self.set_message(kind.canceled());
            return;
        }

        match kind {
            PromptKind::SaveAs | PromptKind::WriteFile => {
                self.save_to(input);
            }
            PromptKind::OpenFile => self.open(input),
            PromptKind::ConfirmExit => {
                if !input.starts_with(['y', 'Y']) {
                    self.quit = true;
                } else if self.session.document().path().is_none() {
                    self.open_prompt(PromptKind::ExitSaveAs);
                } else {
                    self.save();
                    self.quit = !self.session.document().is_modified();
                }
            }
            PromptKind::ExitSaveAs => {
                self.quit = self.save_to(input);
            }
            PromptKind::RunCommand => match Command::from_name(input) {
                Some(command) => self.run(command),
                None => self.set_message(format!("Unknown command: {input}")),
            },
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────

    fn status_line(&self) -> String {
        let doc = self.session.document();
        let name = doc
            .path()
            .map_or_else(|| "[NoName]".to_string(), |p| p.display().to_string());
        format!(
            " {} {}{} | {}/{} ",
            name,
            if doc.is_modified() { "(modified)" } else { "" },
            if doc.is_readonly() { " (read-only)" } else { "" },
            self.session.cursor().row + 1,
            doc.line_count(),
        )
    }

    fn bottom_line(&self) -> String {
        if let Some(prompt) = &self.prompt {
            let mut line = prompt.minibuffer.display();
            if let Some(hint) = &prompt.hint {
                line.push_str(hint);
            }
            return line;
        }
        if self.keymap.is_pending() {
            return "C-x-".to_string();
        }
        self.message.clone().unwrap_or_default()
    }
}

/// Text area (rows, cols) for a terminal size.
fn text_area(size: Size) -> (usize, usize) {
    (
        usize::from(size.rows.saturating_sub(RESERVED_ROWS)),
        usize::from(size.cols),
    )
}

/// The visible part of a line: bytes from `from`, at most `width` of them,
/// with tabs shown as a space and anything outside printable ASCII as `?`.
fn visible_text(line: &[u8], from: usize, width: usize) -> String {
    line.iter()
        .skip(from)
        .take(width)
        .map(|&b| match b {
            b'\t' => ' ',
            0x20..=0x7E => char::from(b),
            _ => '?',
        })
        .collect()
}

/// Completion feedback shown after the prompt input.
fn hint_for(completion: &Completion) -> String {
    if completion.is_unique() {
        " [Sole completion]".to_string()
    } else if completion.candidates.is_empty() {
        " [No match]".to_string()
    } else {
        format!(" {{{}}}", completion.candidates.join(" | "))
    }
}

impl App for Editor {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        self.handle_key(key);
        if self.quit {
            tracing::info!("exit");
            Action::Quit
        } else {
            Action::Continue
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.size = size;
        let (rows, cols) = text_area(size);
        self.session.resize(rows, cols);
    }

    fn paint(&mut self, screen: &mut Screen) {
        self.size = Size {
            cols: screen.cols(),
            rows: screen.rows(),
        };
        let rows = screen.rows();
        let cols = usize::from(screen.cols());
        let text_rows = rows.saturating_sub(RESERVED_ROWS);
        let view = self.session.viewport();
        let doc = self.session.document();

        for y in 0..text_rows {
            if let Some(line) = doc.line(view.row_offset() + usize::from(y)) {
                screen.put_line(y, &visible_text(line, view.col_offset(), cols), false);
            }
        }
        if rows >= RESERVED_ROWS {
            screen.put_line(rows - 2, &self.status_line(), true);
        }
        if rows >= 1 {
            screen.put_line(rows - 1, &self.bottom_line(), false);
        }
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        let Size { cols, rows } = self.size;
        if let Some(prompt) = &self.prompt {
            let x = prompt
                .minibuffer
                .cursor_col()
                .min(usize::from(cols.saturating_sub(1)));
            return Some((u16::try_from(x).ok()?, rows.checked_sub(1)?));
        }

        // The viewport keeps at least one row even when the terminal has
        // no room for text; the cursor is hidden then.
        let (x, y) = self.session.viewport().screen_position(self.session.cursor())?;
        let (x, y) = (u16::try_from(x).ok()?, u16::try_from(y).ok()?);
        (y < rows.saturating_sub(RESERVED_ROWS)).then_some((x, y))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
