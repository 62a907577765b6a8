// SPDX-License-Identifier: MIT
//
// qm-term: terminal layer for qmacs.
//
// Everything the editor needs to talk to a terminal and nothing more:
// raw mode via termios, a handful of ANSI sequences, a background stdin
// reader, a decoder that turns bytes into key events, and a row-based
// screen that only rewrites the rows that changed since the last frame.
//
// No TUI framework is involved.
// The editor is line oriented and single-byte, so the screen model is a
// list of text rows rather than a grid of styled cells.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod reader;
pub mod screen;
pub mod terminal;
