// SPDX-License-Identifier: MIT
//
// Logging setup.
//
// The terminal is in raw mode on the alternate screen while the editor
// runs, so logs only ever go to a file through a non-blocking appender.
//
// Filter priority: QMACS_LOG, then RUST_LOG, then the settings file's
// `log_filter`, then the built-in default. A bare level in QMACS_LOG
// (`QMACS_LOG=debug`) applies to the qmacs crates only; anything with `=`
// or `,` is used as a full filter directive.
//
// Log file: `<data_local_dir>/qmacs/logs/qmacs.log`, or the path given by
// `--log-file` / QMACS_LOG_FILE.

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const LOG_FILE_NAME: &str = "qmacs.log";
const DEFAULT_FILTER: &str = "warn,qmacs=info,qm_editor=info";
const CRATES: [&str; 3] = ["qmacs", "qm_editor", "qm_term"];

/// Keeps the background writer alive. Dropping it flushes the log file.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or a filter directive
/// doesn't parse.
pub fn init(
    log_file: Option<PathBuf>,
    settings_filter: Option<&str>,
) -> Result<LogGuard, Box<dyn std::error::Error + Send + Sync>> {
    let (dir, name) = resolve_log_path(log_file);
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, &name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = create_filter(
        env::var("QMACS_LOG").ok().as_deref(),
        env::var("RUST_LOG").ok().as_deref(),
        settings_filter,
    )?;
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);

    Registry::default().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: guard,
        log_file: dir.join(name),
    })
}

/// Split the log destination into directory and file name.
///
/// An override with an extension is a file; without one it is a directory
/// that gets the default file name.
fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let name = path
                .file_name()
                .map_or_else(|| LOG_FILE_NAME.to_string(), |n| n.to_string_lossy().into_owned());
            return (dir, name);
        }
        return (path, LOG_FILE_NAME.to_string());
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qmacs")
        .join("logs");
    (dir, LOG_FILE_NAME.to_string())
}

fn create_filter(
    qmacs_log: Option<&str>,
    rust_log: Option<&str>,
    settings: Option<&str>,
) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    let directives = qmacs_log
        .map(expand_qmacs_log)
        .or_else(|| rust_log.map(str::to_string))
        .or_else(|| settings.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(directives)
}

/// `debug` becomes `warn,qmacs=debug,qm_editor=debug,qm_term=debug`.
fn expand_qmacs_log(value: &str) -> String {
    if value.contains('=') || value.contains(',') || value.contains(':') {
        return value.to_string();
    }
    let crates: Vec<String> = CRATES.iter().map(|c| format!("{c}={value}")).collect();
    format!("warn,{}", crates.join(","))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
