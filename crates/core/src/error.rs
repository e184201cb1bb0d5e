// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading a line-delimited session file
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Session file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading file: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while locating editor storage directories
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Cannot access directory: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure inside a single format extractor.
///
/// The runner never propagates these; they degrade that extractor to "no result".
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

impl DiscoveryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let err = ReadError::io(
            "/path/to/session.jsonl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/path/to/session.jsonl"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_read_error_io_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ReadError::io("/test/path", io_err);
        assert!(matches!(err, ReadError::PermissionDenied { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        let err = ReadError::io("/test/path", io_err);
        assert!(matches!(err, ReadError::Io { .. }));
    }

    #[test]
    fn test_discovery_error_display() {
        let err = DiscoveryError::HomeDirNotFound;
        assert!(err.to_string().contains("Home directory"));
    }

    #[test]
    fn test_extract_error_wraps_read_error() {
        let read = ReadError::io(
            "/x.jsonl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let err: ExtractError = read.into();
        assert!(err.to_string().contains("/x.jsonl"));
    }
}
