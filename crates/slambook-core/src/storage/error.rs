//! Storage errors
//!
//! I/O failures carry the path involved and whether it was being read or
//! written, sorted into the few kinds a user can do something about.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Direction of the failed file access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// Errors raised by the storage backends
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not create data directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied: cannot {access} {path:?}")]
    PermissionDenied {
        path: PathBuf,
        access: Access,
        #[source]
        source: io::Error,
    },

    #[error("No space left to write {path:?}")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("Could not {access} {path:?}: {source}")]
    Io {
        path: PathBuf,
        access: Access,
        #[source]
        source: io::Error,
    },

    /// The temp file was written but could not be moved into place
    #[error("Could not replace {path:?} with the new data: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} does not hold valid slam book data ({details}). A copy was kept at {backup_path:?}.")]
    CorruptDocument {
        path: PathBuf,
        backup_path: PathBuf,
        details: String,
    },

    #[error("Could not encode data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend cannot be used at all (e.g. a poisoned in-memory lock)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Classify a failure while reading `path`
    pub fn read_failure(error: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::classify(error, path.into(), Access::Read)
    }

    /// Classify a failure while writing `path`
    pub fn write_failure(error: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::classify(error, path.into(), Access::Write)
    }

    fn classify(error: io::Error, path: PathBuf, access: Access) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                access,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if access == Access::Write && is_out_of_space(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::Io {
                path,
                access,
                source: error,
            },
        }
    }

    /// What the user can try next, when there is something to try
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and run the command again."),
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => {
                Some("Check the permissions of the slambook data directory, or point data_dir somewhere writable with `slambook config set data_dir <path>`.")
            }
            StorageError::CorruptDocument { .. } => {
                Some("The damaged file was copied aside. Books can be recovered from the copy by hand.")
            }
            _ => None,
        }
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left") || msg.contains("quota") || msg.contains("disk full")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::write_failure(io_err, "/data/slam_books.json");

        assert!(matches!(
            err,
            StorageError::PermissionDenied {
                access: Access::Write,
                ..
            }
        ));
        assert!(err.to_string().contains("cannot write"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_out_of_space_only_on_write() {
        let err = StorageError::write_failure(
            io::Error::new(io::ErrorKind::Other, "Quota exceeded"),
            "/full/disk",
        );
        assert!(matches!(err, StorageError::DiskFull { .. }));

        let err = StorageError::read_failure(
            io::Error::new(io::ErrorKind::Other, "Quota exceeded"),
            "/full/disk",
        );
        assert!(matches!(err, StorageError::Io { access: Access::Read, .. }));
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = StorageError::read_failure(
            io::Error::new(io::ErrorKind::NotFound, "gone"),
            "/missing",
        );
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_corrupt_document_message() {
        let err = StorageError::CorruptDocument {
            path: PathBuf::from("/data/slam_books.json"),
            backup_path: PathBuf::from("/data/slam_books.json.corrupt.backup"),
            details: "expected value at line 1 column 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("valid slam book data"));
        assert!(msg.contains("corrupt.backup"));
        assert!(err.recovery_suggestion().is_some());
    }
}
