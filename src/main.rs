// SPDX-License-Identifier: MIT
//
// qmacs: a small terminal text editor with Emacs key bindings.
//
// This is the main binary that wires together the crates:
//
//   qm-term   → terminal control, rendering, input parsing, event loop
//   qm-editor → document, cursor, viewport, keymap, prompts, settings
//
// The Editor (editor.rs) implements qm-term's App trait. Each keypress
// flows through:
//
//   stdin → parser → on_key → keymap / minibuffer → session mutation
//   paint → screen rows → diff renderer → terminal

mod editor;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use qm_editor::settings::Settings;
use qm_term::event_loop::EventLoop;

use crate::editor::Editor;

#[derive(Debug, Parser)]
#[command(name = "qmacs", version, about = "A small terminal editor with Emacs key bindings")]
struct Cli {
    /// File to edit. Created on the first save if it doesn't exist.
    file: Option<PathBuf>,

    /// Open the document read-only (toggle with C-x C-q).
    #[arg(long)]
    read_only: bool,

    /// Settings file [default: <config dir>/qmacs/settings.json].
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log file, or a directory for qmacs.log.
    #[arg(long, value_name = "PATH", env = "QMACS_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Spaces inserted by Tab.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    tab_width: Option<u16>,
}

impl Cli {
    /// Command-line flags win over the settings file.
    fn apply(&self, settings: &mut Settings) {
        if self.read_only {
            settings.read_only = true;
        }
        if let Some(width) = self.tab_width {
            settings.tab_width = usize::from(width);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut settings = Settings::load_or_default(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("qmacs: {e}");
        process::exit(1);
    });
    cli.apply(&mut settings);

    let _log_guard = match logging::init(cli.log_file.clone(), settings.log_filter.as_deref()) {
        Ok(guard) => {
            tracing::info!(log_file = %guard.log_file.display(), "qmacs starting");
            Some(guard)
        }
        Err(e) => {
            eprintln!("qmacs: logging disabled: {e}");
            None
        }
    };

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("qmacs: failed to initialize terminal: {e}");
        process::exit(1);
    });

    let mut editor = Editor::new(event_loop.size(), cli.file.as_deref(), &settings);

    if let Err(e) = event_loop.run(&mut editor) {
        tracing::error!(error = %e, "event loop failed");
        eprintln!("qmacs: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
