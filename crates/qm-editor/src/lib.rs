//! # qm-editor: Editor core for qmacs
//!
//! - **[`line_store`]**: `LineStore`, the ordered lines of a document as bytes
//! - **[`document`]**: `Document` wrapping a line store with path, modified
//!   and read-only flags, plus file load/save
//! - **[`position`]**, **[`cursor`]**, **[`word`]**: cursor coordinates and
//!   the movement primitives (char, line, word)
//! - **[`viewport`]**: the scrolling window and the scroll-to-cursor rule
//! - **[`session`]**: `Session`, the single owned editing state that every
//!   intent goes through
//! - **[`keymap`]**: Emacs-style key bindings resolved to `Command`s
//! - **[`minibuffer`]**: the one-line prompt
//! - **[`complete`]**: filesystem path completion for file prompts
//! - **[`settings`]**: user settings loaded from JSON
//! - **[`error`]**: the crate error type

pub mod complete;
pub mod cursor;
pub mod document;
pub mod error;
pub mod keymap;
pub mod line_store;
pub mod minibuffer;
pub mod position;
pub mod session;
pub mod settings;
pub mod viewport;
pub mod word;

pub use error::{Error, Result};
