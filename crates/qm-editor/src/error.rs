//! Error type for editor operations.
//!
//! Messages are short enough to show on the message line as-is.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no file name")]
    NoPath,

    #[error("buffer is read-only")]
    ReadOnly,

    #[error("invalid settings in {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = Error::Open {
            path: PathBuf::from("/tmp/x.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "cannot open /tmp/x.txt: not found");

        let err = Error::Write {
            path: PathBuf::from("out"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "cannot write out: denied");
    }

    #[test]
    fn io_errors_are_sources() {
        use std::error::Error as _;

        let err = Error::Open {
            path: PathBuf::from("a"),
            source: io::Error::other("boom"),
        };
        assert_eq!(err.source().map(ToString::to_string), Some("boom".to_string()));
        assert!(Error::NoPath.source().is_none());
    }

    #[test]
    fn simple_messages() {
        assert_eq!(Error::NoPath.to_string(), "no file name");
        assert_eq!(Error::ReadOnly.to_string(), "buffer is read-only");
    }
}
