//! Centralized error types for mboxsplit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxsplit library.
///
/// Classification and sanitization are total functions and never fail, so
/// every variant here is either an I/O problem or a configuration problem.
#[derive(Error, Debug)]
pub enum SplitError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The source MBOX does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A resolved output file is the source archive itself.
    #[error("Output file would overwrite the input archive: {0}")]
    OutputIsInput(PathBuf),
}

/// Convenience alias for `Result<T, SplitError>`.
pub type Result<T> = std::result::Result<T, SplitError>;

impl SplitError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `SplitError::io`).
impl From<std::io::Error> for SplitError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = SplitError::io(
            "out/split_Inbox.mbox",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        let msg = err.to_string();
        assert!(msg.contains("split_Inbox.mbox"));
        assert!(msg.contains("disk full"));
    }
}
