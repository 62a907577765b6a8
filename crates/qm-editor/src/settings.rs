//! User settings, read from a JSON file.
//!
//! ```json
//! { "tab_width": 2, "read_only": false, "log_filter": "qmacs=debug" }
//! ```
//!
//! Every field is optional. The default location is
//! `<config dir>/qmacs/settings.json`; a missing file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::DEFAULT_TAB_WIDTH;

const SETTINGS_DIR: &str = "qmacs";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spaces inserted by Tab. Values below 1 are raised to 1.
    pub tab_width: usize,
    /// Open documents read-only.
    pub read_only: bool,
    /// `tracing` filter directive, used when no environment filter is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            read_only: false,
            log_filter: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text.
    ///
    /// # Errors
    ///
    /// [`Error::Settings`] if the text is not valid settings JSON; `origin`
    /// names the source in the message.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(text).map_err(|source| Error::Settings {
            path: origin.to_path_buf(),
            source,
        })?;
        settings.tab_width = settings.tab_width.max(1);
        Ok(settings)
    }

    /// Load settings from `path`. A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file exists but can't be read,
    /// [`Error::Settings`] if it can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::from_json(&text, path)?;
                tracing::info!(path = %path.display(), "settings loaded");
                Ok(settings)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(Error::Open {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from `path` if given, otherwise from [`default_path`]. Without
    /// a config directory the defaults are used.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// `<config dir>/qmacs/settings.json`, if the platform has a config dir.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn origin() -> &'static Path {
        Path::new("settings.json")
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.tab_width, 4);
        assert!(!s.read_only);
        assert_eq!(s.log_filter, None);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(Settings::from_json("{}", origin()).unwrap(), Settings::default());
    }

    #[test]
    fn all_fields() {
        let s = Settings::from_json(
            r#"{ "tab_width": 2, "read_only": true, "log_filter": "qmacs=debug" }"#,
            origin(),
        )
        .unwrap();
        assert_eq!(
            s,
            Settings {
                tab_width: 2,
                read_only: true,
                log_filter: Some("qmacs=debug".into()),
            }
        );
    }

    #[test]
    fn zero_tab_width_is_raised() {
        let s = Settings::from_json(r#"{ "tab_width": 0 }"#, origin()).unwrap();
        assert_eq!(s.tab_width, 1);
    }

    #[test]
    fn invalid_json_is_settings_error() {
        let err = Settings::from_json("{ tab_width: ", origin()).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
        assert!(err.to_string().starts_with("invalid settings in settings.json"));
    }

    #[test]
    fn wrong_type_is_settings_error() {
        let err = Settings::from_json(r#"{ "read_only": "yes" }"#, origin()).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tab_width": 8 }"#).unwrap();
        let s = Settings::load_or_default(Some(&path)).unwrap();
        assert_eq!(s.tab_width, 8);
    }

    #[test]
    fn serializes_without_empty_filter() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(json, r#"{"tab_width":4,"read_only":false}"#);
    }

    #[test]
    fn default_path_ends_with_file_name() {
        if let Some(path) = default_path() {
            assert!(path.ends_with("qmacs/settings.json"));
        }
    }
}
