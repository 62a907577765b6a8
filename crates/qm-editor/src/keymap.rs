//! Key bindings: Emacs-style keys resolved to editor commands.
//!
//! | Keys                              | Command                   |
//! |-----------------------------------|---------------------------|
//! | `C-f` / Right, `C-b` / Left       | `forward-char`, `backward-char` |
//! | `C-n` / Down, `C-p` / Up          | `next-line`, `previous-line` |
//! | `C-a` / Home, `C-e` / End         | `move-beginning-of-line`, `move-end-of-line` |
//! | `M-f` / C-Right, `M-b` / C-Left   | `forward-word`, `backward-word` |
//! | `C-v` / PageDown, `M-v` / PageUp  | `scroll-up-command`, `scroll-down-command` |
//! | Backspace, Enter, Tab             | `delete-backward-char`, `newline`, `insert-tab` |
//! | `C-s`, `C-x C-s`                  | `save-buffer`             |
//! | `C-x C-w`                         | `write-file`              |
//! | `C-x C-f`                         | `find-file`               |
//! | `C-x C-q`                         | `read-only-mode`          |
//! | `C-x C-c`                         | `save-buffers-kill-terminal` |
//! | `M-x`                             | `execute-extended-command` |
//! | `C-g`                             | `keyboard-quit`           |
//!
//! Printable ASCII inserts itself. `C-x` is a prefix: the key after it is
//! looked up in the prefix table, and anything not bound there resolves to
//! [`Resolved::UnknownPrefix`].

use qm_term::input::{KeyCode, KeyEvent, Modifiers};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// An editor intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ForwardChar,
    BackwardChar,
    NextLine,
    PreviousLine,
    LineStart,
    LineEnd,
    ForwardWord,
    BackwardWord,
    PageDown,
    PageUp,
    DeleteBackward,
    Newline,
    InsertTab,
    /// Insert this byte at the cursor.
    SelfInsert(u8),
    Save,
    WriteFile,
    FindFile,
    ToggleReadOnly,
    Exit,
    ExecuteCommand,
    Cancel,
    Help,
}

impl Command {
    /// Every command reachable by name through `M-x`.
    pub const NAMED: [Self; 21] = [
        Self::ForwardChar,
        Self::BackwardChar,
        Self::NextLine,
        Self::PreviousLine,
        Self::LineStart,
        Self::LineEnd,
        Self::ForwardWord,
        Self::BackwardWord,
        Self::PageDown,
        Self::PageUp,
        Self::DeleteBackward,
        Self::Newline,
        Self::InsertTab,
        Self::Save,
        Self::WriteFile,
        Self::FindFile,
        Self::ToggleReadOnly,
        Self::Exit,
        Self::ExecuteCommand,
        Self::Cancel,
        Self::Help,
    ];

    /// The `M-x` name. `None` for [`SelfInsert`](Self::SelfInsert).
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::ForwardChar => "forward-char",
            Self::BackwardChar => "backward-char",
            Self::NextLine => "next-line",
            Self::PreviousLine => "previous-line",
            Self::LineStart => "move-beginning-of-line",
            Self::LineEnd => "move-end-of-line",
            Self::ForwardWord => "forward-word",
            Self::BackwardWord => "backward-word",
            Self::PageDown => "scroll-up-command",
            Self::PageUp => "scroll-down-command",
            Self::DeleteBackward => "delete-backward-char",
            Self::Newline => "newline",
            Self::InsertTab => "insert-tab",
            Self::SelfInsert(_) => return None,
            Self::Save => "save-buffer",
            Self::WriteFile => "write-file",
            Self::FindFile => "find-file",
            Self::ToggleReadOnly => "read-only-mode",
            Self::Exit => "save-buffers-kill-terminal",
            Self::ExecuteCommand => "execute-extended-command",
            Self::Cancel => "keyboard-quit",
            Self::Help => "help",
        };
        Some(name)
    }

    /// Look a command up by its `M-x` name. Surrounding whitespace is
    /// ignored.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::NAMED.into_iter().find(|c| c.name() == Some(name))
    }

    /// Named commands starting with `prefix`, in table order.
    #[must_use]
    pub fn names_with_prefix(prefix: &str) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter_map(|c| c.name())
            .filter(|n| n.starts_with(prefix))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Keymap
// ---------------------------------------------------------------------------

/// What a key press amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Command(Command),
    /// `C-x` was pressed; waiting for the next key.
    Prefix,
    /// The key after `C-x` isn't bound.
    UnknownPrefix,
    /// Not bound to anything.
    Unbound,
}

/// Key resolver holding the `C-x` prefix state.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    prefix: bool,
}

impl Keymap {
    #[must_use]
    pub const fn new() -> Self {
        Self { prefix: false }
    }

    /// A `C-x` is waiting for its second key.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.prefix
    }

    /// Drop a pending prefix.
    pub const fn reset(&mut self) {
        self.prefix = false;
    }

    /// Resolve one key press.
    pub fn resolve(&mut self, key: KeyEvent) -> Resolved {
        if self.prefix {
            self.prefix = false;
            return resolve_prefixed(key);
        }
        if key.is_ctrl('x') {
            self.prefix = true;
            return Resolved::Prefix;
        }
        resolve_global(key).map_or(Resolved::Unbound, Resolved::Command)
    }
}

fn resolve_prefixed(key: KeyEvent) -> Resolved {
    if key.modifiers != Modifiers::CTRL {
        return Resolved::UnknownPrefix;
    }
    let command = match key.code {
        KeyCode::Char('s') => Command::Save,
        KeyCode::Char('w') => Command::WriteFile,
        KeyCode::Char('f') => Command::FindFile,
        KeyCode::Char('q') => Command::ToggleReadOnly,
        KeyCode::Char('c') => Command::Exit,
        KeyCode::Char('g') => Command::Cancel,
        _ => return Resolved::UnknownPrefix,
    };
    Resolved::Command(command)
}

fn resolve_global(key: KeyEvent) -> Option<Command> {
    let mods = key.modifiers;

    if mods == Modifiers::CTRL {
        return match key.code {
            KeyCode::Char('f') => Some(Command::ForwardChar),
            KeyCode::Char('b') => Some(Command::BackwardChar),
            KeyCode::Char('n') => Some(Command::NextLine),
            KeyCode::Char('p') => Some(Command::PreviousLine),
            KeyCode::Char('a') => Some(Command::LineStart),
            KeyCode::Char('e') => Some(Command::LineEnd),
            KeyCode::Char('v') => Some(Command::PageDown),
            KeyCode::Char('s') => Some(Command::Save),
            KeyCode::Char('g') => Some(Command::Cancel),
            KeyCode::Right => Some(Command::ForwardWord),
            KeyCode::Left => Some(Command::BackwardWord),
            _ => None,
        };
    }

    if mods == Modifiers::ALT {
        return match key.code {
            KeyCode::Char('f') | KeyCode::Right => Some(Command::ForwardWord),
            KeyCode::Char('b') | KeyCode::Left => Some(Command::BackwardWord),
            KeyCode::Char('v') => Some(Command::PageUp),
            KeyCode::Char('x') => Some(Command::ExecuteCommand),
            _ => None,
        };
    }

    if !(mods.is_empty() || mods == Modifiers::SHIFT) {
        return None;
    }

    match key.code {
        KeyCode::Right => Some(Command::ForwardChar),
        KeyCode::Left => Some(Command::BackwardChar),
        KeyCode::Down => Some(Command::NextLine),
        KeyCode::Up => Some(Command::PreviousLine),
        KeyCode::Home => Some(Command::LineStart),
        KeyCode::End => Some(Command::LineEnd),
        KeyCode::PageDown => Some(Command::PageDown),
        KeyCode::PageUp => Some(Command::PageUp),
        KeyCode::Backspace => Some(Command::DeleteBackward),
        KeyCode::Enter => Some(Command::Newline),
        KeyCode::Tab => Some(Command::InsertTab),
        KeyCode::Char(ch) if ch.is_ascii_graphic() || ch == ' ' => {
            u8::try_from(ch).ok().map(Command::SelfInsert)
        }
        _ => None,
    }
}

/// One-line summary of the main bindings, for `M-x help`.
pub const HELP: &str = "C-x C-s save | C-x C-w write | C-x C-f open | C-x C-q read-only | \
                        C-x C-c exit | M-x command | C-g cancel";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
