//! Minibuffer: the one-line prompt on the last screen row.
//!
//! A prompt collects a line of text: printable characters append,
//! Backspace deletes the last character, Enter submits and `C-g` cancels.
//! Tab asks for completion, which the caller performs (file prompts
//! complete paths, `M-x` completes command names) and writes back with
//! [`set_input`](Minibuffer::set_input).

use qm_term::input::{KeyCode, KeyEvent, Modifiers};

/// Result of feeding one key to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Still editing.
    Pending,
    /// Enter: the final input.
    Submit(String),
    /// `C-g`.
    Cancel,
    /// Tab: the caller should complete the current input.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minibuffer {
    prompt: String,
    input: String,
}

impl Minibuffer {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Prompt followed by the input, as shown on screen.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.prompt, self.input)
    }

    /// Screen column of the input cursor (always at the end of the input).
    #[must_use]
    pub fn cursor_col(&self) -> usize {
        self.prompt.chars().count() + self.input.chars().count()
    }

    /// Feed one key.
    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        if key.is_ctrl('g') {
            return Outcome::Cancel;
        }
        if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return Outcome::Pending;
        }
        match key.code {
            KeyCode::Enter => Outcome::Submit(self.input.clone()),
            KeyCode::Tab => Outcome::Complete,
            KeyCode::Backspace => {
                self.input.pop();
                Outcome::Pending
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                self.input.push(ch);
                Outcome::Pending
            }
            _ => Outcome::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
