// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop.
//
// Stdin bytes arrive from the background reader, the parser turns them into
// key events, the application handles them and paints the screen, and the
// screen writes only the rows that changed.
//
// The loop blocks on the reader channel with a short timeout. Input is
// handled as soon as it arrives; when the timeout fires the parser is
// flushed so a lone ESC becomes an Escape key instead of hanging around as
// a possible Meta prefix. Nothing is painted unless something changed.
//
// Resize is signalled by SIGWINCH, whose handler only sets an `AtomicBool`.
// The loop checks the flag every iteration.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi;
use crate::input::{KeyEvent, Parser};
use crate::reader::StdinReader;
use crate::screen::Screen;
use crate::terminal::{Size, Terminal};

/// How long a lone ESC waits for the rest of a sequence before it counts as
/// the Escape key.
const ESC_TIMEOUT: Duration = Duration::from_micros(8333);

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ──────────────────────────────────────────────────────────────

/// What the application tells the loop after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Application interface for the event loop.
///
/// Per iteration the loop calls [`on_key`](App::on_key) for each decoded
/// key, [`on_resize`](App::on_resize) after SIGWINCH, then
/// [`paint`](App::paint) and [`cursor`](App::cursor) if anything changed.
pub trait App {
    /// Handle one key. Return [`Action::Quit`] to leave the loop.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// The terminal was resized. The screen has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole frame. The screen has been cleared.
    fn paint(&mut self, screen: &mut Screen);

    /// Where to show the hardware cursor as `(x, y)`, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

/// Owns the terminal and the input parser. [`run`](Self::run) returns when
/// the application asks to quit or stdin closes.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
}

impl EventLoop {
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until quit, and restore the terminal even if
    /// the loop fails.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, teardown, or output fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let (mut reader, rx) = match StdinReader::spawn() {
            Ok(pair) => pair,
            Err(err) => {
                self.terminal.leave()?;
                return Err(err);
            }
        };

        let size = self.terminal.size();
        tracing::debug!(cols = size.cols, rows = size.rows, "event loop started");

        let result = self.run_inner(app, &rx);

        reader.stop();
        self.terminal.leave()?;
        tracing::debug!("event loop finished");

        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut screen = Screen::new(size.cols, size.rows);
        let mut dirty = true;

        loop {
            let keys = match rx.recv_timeout(ESC_TIMEOUT) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => {
                    self.parser.flush()
                }
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("input channel closed");
                    return Ok(());
                }
            };

            for key in &keys {
                if app.on_key(*key) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !keys.is_empty();

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                tracing::debug!(cols = size.cols, rows = size.rows, "resize");
                screen.resize(size.cols, size.rows);
                app.on_resize(size);
                dirty = true;
            }

            if dirty {
                draw(app, &mut screen)?;
                dirty = false;
            }
        }
    }
}

/// Paint one frame and position the cursor.
fn draw(app: &mut impl App, screen: &mut Screen) -> io::Result<()> {
    screen.clear();
    app.paint(screen);

    let stdout = io::stdout();
    let mut lock = stdout.lock();
    screen.render(&mut lock)?;
    if let Some((x, y)) = app.cursor() {
        ansi::cursor_to(&mut lock, x, y)?;
        ansi::cursor_show(&mut lock)?;
    } else {
        ansi::cursor_hide(&mut lock)?;
    }
    lock.flush()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
