// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and restore on drop.
//
// All libc calls live in the `sys` module below as small safe wrappers, so
// the rest of the file is ordinary Rust. Raw mode clears ISIG and IXON as
// well as the usual ICANON/ECHO: C-c, C-s, C-q and C-g have to reach the
// key parser as bytes.
//
// A panic while the terminal is raw would leave the shell unusable, so
// `enter` saves the cooked termios in a global slot and installs a panic
// hook once per process. The hook writes its reset bytes with a raw fd
// write (stdout may be locked mid-frame) and puts the saved termios back.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the size can't be queried (pipes, tests).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Current size of the terminal on stdout, if it is one.
#[must_use]
pub fn get_size() -> Option<Size> {
    sys::window_size().filter(|s| s.cols > 0 && s.rows > 0)
}

/// Whether stdin is a terminal.
#[must_use]
pub fn is_tty() -> bool {
    sys::stdin_is_tty()
}

// ─── Platform layer ─────────────────────────────────────────────────────────

#[cfg(unix)]
mod sys {
    use std::io;

    use super::Size;

    pub type Mode = libc::termios;

    const FD: libc::c_int = libc::STDIN_FILENO;

    pub fn window_size() -> Option<Size> {
        // SAFETY: winsize is plain data; ioctl only writes into it.
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
        (rc == 0).then_some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }

    pub fn stdin_is_tty() -> bool {
        // SAFETY: isatty only inspects the descriptor.
        unsafe { libc::isatty(FD) != 0 }
    }

    pub fn get_mode() -> io::Result<Mode> {
        // SAFETY: termios is plain data and tcgetattr fills it in.
        let mut mode: Mode = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(FD, &raw mut mode) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(mode)
    }

    pub fn set_mode(mode: &Mode) -> io::Result<()> {
        // SAFETY: `mode` points to a valid termios for the whole call.
        if unsafe { libc::tcsetattr(FD, libc::TCSAFLUSH, mode) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// `cfmakeraw`, plus blocking one-byte reads.
    pub fn make_raw(mode: &mut Mode) {
        mode.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        mode.c_oflag &= !libc::OPOST;
        mode.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
        mode.c_cflag &= !(libc::CSIZE | libc::PARENB);
        mode.c_cflag |= libc::CS8;
        mode.c_cc[libc::VMIN] = 1;
        mode.c_cc[libc::VTIME] = 0;
    }

    pub fn write_stdout_raw(bytes: &[u8]) {
        // SAFETY: the pointer and length come from a live slice.
        unsafe {
            libc::write(libc::STDOUT_FILENO, bytes.as_ptr().cast(), bytes.len());
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io::{self, Write};

    use super::Size;

    #[derive(Debug, Clone, Copy)]
    pub struct Mode;

    pub const fn window_size() -> Option<Size> {
        None
    }

    pub const fn stdin_is_tty() -> bool {
        false
    }

    pub const fn get_mode() -> io::Result<Mode> {
        Ok(Mode)
    }

    pub const fn set_mode(_mode: &Mode) -> io::Result<()> {
        Ok(())
    }

    pub const fn make_raw(_mode: &mut Mode) {}

    pub fn write_stdout_raw(bytes: &[u8]) {
        let mut out = io::stdout();
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }
}

// ─── Panic restore ──────────────────────────────────────────────────────────

/// Cooked mode saved by `enter`, for the panic hook.
static COOKED_MODE: Mutex<Option<sys::Mode>> = Mutex::new(None);

static HOOK: Once = Once::new();

/// Bytes the panic hook writes: end sync, reset attributes, show the
/// cursor, then leave the alternate screen.
const PANIC_RESET: &[u8] = b"\x1b[?2026l\x1b[0m\x1b[?25h\x1b[?1049l";

fn remember_cooked(mode: Option<sys::Mode>) {
    if let Ok(mut slot) = COOKED_MODE.lock() {
        *slot = mode;
    }
}

fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            sys::write_stdout_raw(PANIC_RESET);
            let saved = COOKED_MODE.lock().ok().and_then(|mut slot| slot.take());
            if let Some(mode) = saved {
                let _ = sys::set_mode(&mode);
            }
            previous(info);
        }));
    });
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Handle on the controlling terminal.
///
/// [`enter`](Self::enter) switches to raw mode on the alternate screen;
/// [`leave`](Self::leave), dropping the handle or a panic switches back.
pub struct Terminal {
    /// Mode to go back to. `None` when stdin isn't a tty or not entered.
    cooked: Option<sys::Mode>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle sized to the current terminal (80×24 when unknown). Does not
    /// touch the terminal mode.
    ///
    /// # Errors
    ///
    /// Infallible today; kept as `Result` for platforms whose setup can fail.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            cooked: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Query the size again (after SIGWINCH). Keeps the old value if the
    /// query fails.
    pub fn refresh_size(&mut self) -> Size {
        self.size = get_size().unwrap_or(self.size);
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode plus alternate screen. Does nothing if already entered.
    ///
    /// # Errors
    ///
    /// Fails if the terminal mode can't be read or set, or stdout fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();

        if is_tty() {
            let cooked = sys::get_mode()?;
            let mut raw = cooked;
            sys::make_raw(&mut raw);
            sys::set_mode(&raw)?;
            self.cooked = Some(cooked);
            remember_cooked(Some(cooked));
        }

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        self.active = true;
        Ok(())
    }

    /// Back to the main screen in cooked mode. Does nothing if not entered.
    ///
    /// # Errors
    ///
    /// Fails if stdout fails or the saved mode can't be restored.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        {
            let mut out = io::stdout().lock();
            ansi::end_sync(&mut out)?;
            ansi::reset(&mut out)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            out.flush()?;
        }

        if let Some(cooked) = self.cooked.take() {
            sys::set_mode(&cooked)?;
            remember_cooked(None);
        }
        self.active = false;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_size() {
        assert_eq!(Size::FALLBACK, Size { cols: 80, rows: 24 });
    }

    #[test]
    fn queries_do_not_panic() {
        let _ = get_size();
        let _ = is_tty();
    }

    #[test]
    fn panic_reset_leaves_alt_screen_last() {
        let s = std::str::from_utf8(PANIC_RESET).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
        assert!(s.contains("\x1b[?25h"));
        assert!(s.contains("\x1b[0m"));
    }

    #[cfg(unix)]
    #[test]
    fn raw_mode_passes_control_keys_through() {
        // SAFETY: termios is plain data.
        let mut mode: libc::termios = unsafe { std::mem::zeroed() };
        mode.c_lflag = libc::ICANON | libc::ECHO | libc::ISIG;
        mode.c_iflag = libc::IXON | libc::ICRNL;
        sys::make_raw(&mut mode);

        assert_eq!(mode.c_lflag & (libc::ICANON | libc::ECHO | libc::ISIG), 0);
        assert_eq!(mode.c_iflag & (libc::IXON | libc::ICRNL), 0);
        assert_eq!(mode.c_cflag & libc::CS8, libc::CS8);
        assert_eq!(mode.c_cc[libc::VMIN], 1);
    }

    #[test]
    fn new_terminal_is_inactive() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn leave_without_enter_is_noop() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn refresh_size_updates_cache() {
        let mut term = Terminal::new().unwrap();
        let s = term.refresh_size();
        assert_eq!(s, term.size());
    }
}
