// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes into key events. Only the legacy encodings are
// handled because the terminal is never switched into the Kitty keyboard
// or mouse protocols:
//
// - C0 control bytes (C-a .. C-z, with Tab / Enter / Backspace carved out)
// - CSI sequences for arrows, Home/End, PageUp/PageDown, Delete, Insert,
//   with xterm modifier parameters (`ESC [ 1 ; 5 C` is Ctrl+Right)
// - SS3 sequences (`ESC O A` and friends)
// - Meta as an ESC prefix (`ESC f` is M-f)
// - UTF-8 multi-byte characters
//
// Escape sequences can straddle `read()` calls, so the decoder keeps the
// undecoded tail in a small buffer. A lone ESC stays pending until either
// more bytes arrive or the caller flushes after a timeout.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// `C-<ch>`.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }

    /// `M-<ch>`.
    #[must_use]
    pub const fn alt(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::ALT,
        }
    }

    /// True when this is `C-<ch>` with no other modifiers.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.code == KeyCode::Char(ch) && self.modifiers == Modifiers::CTRL
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A character key. Control chords are reported as the lowercase letter
    /// plus [`Modifiers::CTRL`].
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier flags, in xterm's `1 + bitmask` parameter order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental byte-to-key decoder.
///
/// Feed bytes with [`advance`](Parser::advance); call
/// [`flush`](Parser::flush) after an idle timeout to turn a pending lone
/// ESC into an Escape key.
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

/// Result of decoding at the head of the buffer.
enum Decoded {
    Key(KeyEvent, usize),
    Incomplete,
    Skip(usize),
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Append `data` and return every key that can be decoded.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match decode(&self.buf[pos..]) {
                Decoded::Key(key, used) => {
                    keys.push(key);
                    pos += used;
                }
                Decoded::Skip(used) => pos += used,
                Decoded::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        keys
    }

    /// Bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes after a timeout.
    ///
    /// A lone ESC becomes [`KeyCode::Escape`]; `ESC [` or `ESC O` that never
    /// completed becomes Escape followed by the literal character.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        for &byte in &self.buf {
            match byte {
                0x1B => keys.push(KeyEvent::plain(KeyCode::Escape)),
                b @ 0x20..=0x7E => keys.push(KeyEvent::plain(KeyCode::Char(b as char))),
                _ => {}
            }
        }
        self.buf.clear();
        keys
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

fn decode(buf: &[u8]) -> Decoded {
    match buf[0] {
        0x1B => decode_escape(buf),
        b => decode_single(b).map_or_else(
            || {
                if b >= 0xC0 {
                    decode_utf8(buf)
                } else {
                    Decoded::Skip(1)
                }
            },
            |key| Decoded::Key(key, 1),
        ),
    }
}

/// Decode a byte that stands on its own (controls and printable ASCII).
fn decode_single(byte: u8) -> Option<KeyEvent> {
    let key = match byte {
        0x00 => KeyEvent::ctrl('@'),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        b @ 0x01..=0x1A => KeyEvent::ctrl((b + b'a' - 1) as char),
        b @ 0x20..=0x7E => KeyEvent::plain(KeyCode::Char(b as char)),
        _ => return None,
    };
    Some(key)
}

fn decode_escape(buf: &[u8]) -> Decoded {
    let Some(&next) = buf.get(1) else {
        return Decoded::Incomplete;
    };

    match next {
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        0x1B => Decoded::Key(
            KeyEvent {
                code: KeyCode::Escape,
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        _ => match decode_single(next) {
            Some(mut key) => {
                key.modifiers |= Modifiers::ALT;
                Decoded::Key(key, 2)
            }
            None => Decoded::Key(KeyEvent::plain(KeyCode::Escape), 1),
        },
    }
}

fn decode_csi(buf: &[u8]) -> Decoded {
    // Parameter bytes 0x30..=0x3F, final byte 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Decoded::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Decoded::Skip(end + 1);
        }
        end += 1;
    }

    let params = parse_params(&buf[2..end]);
    let used = end + 1;
    let modifiers = params.get(1).copied().map_or(Modifiers::empty(), decode_modifiers);

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Decoded::Skip(used),
        },
        _ => return Decoded::Skip(used),
    };

    Decoded::Key(KeyEvent { code, modifiers }, used)
}

fn decode_ss3(buf: &[u8]) -> Decoded {
    let Some(&b) = buf.get(2) else {
        return Decoded::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Decoded::Skip(3),
    };
    Decoded::Key(KeyEvent::plain(code), 3)
}

fn decode_utf8(buf: &[u8]) -> Decoded {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Decoded::Skip(1),
    };
    if buf.len() < len {
        return Decoded::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Decoded::Skip(1), |ch| {
            Decoded::Key(KeyEvent::plain(KeyCode::Char(ch)), len)
        })
}

/// Parse `;`-separated decimal parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm encodes modifiers as `1 + bitmask`; 0 and 1 both mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(bits as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
