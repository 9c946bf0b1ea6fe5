//! Backing-store errors
//!
//! Every failure the mirror can hit while reading, writing or encoding.
//! `recovery_suggestion` gives the hint that travels with a failed persist
//! into the storage status shown to the user.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Hint for a medium that accepts nothing durable
pub(crate) const MEMORY_ONLY_HINT: &str = "Edits are kept in memory for this session only.";

/// Errors raised by a `KeyValueStore` or while encoding the mirror
#[derive(Error, Debug)]
pub enum StorageError {
    /// The medium is switched off or unreachable
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Cannot create mirror directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' does not exist")]
    NotFound { path: PathBuf },

    /// The temp file was written but could not replace the key file
    #[error("Cannot move '{from}' into place at '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The mirror snapshot could not be serialized
    #[error("Cannot encode mirror snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// What the user can do about it, when there is anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => {
                Some("Free up disk space; edits stay in memory until then.")
            }
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => {
                Some("Point data_dir at a writable directory (docsmith config set data_dir <path>).")
            }
            StorageError::Unavailable { .. } => Some(MEMORY_ONLY_HINT),
            _ => None,
        }
    }
}

fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_suggests_data_dir() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/srv/docsmith/mirror"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().unwrap().contains("data_dir"));
    }

    #[test]
    fn test_not_found_has_no_suggestion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = StorageError::from_io(io_err, PathBuf::from("/missing/key"));

        assert!(matches!(err, StorageError::NotFound { .. }));
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_encode_error_converts() {
        let json_err = serde_json::from_str::<u8>("not json").unwrap_err();
        let err: StorageError = json_err.into();

        assert!(err.to_string().starts_with("Cannot encode mirror snapshot"));
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_unavailable_display() {
        let err = StorageError::Unavailable {
            reason: "private mode".to_string(),
        };

        assert_eq!(err.to_string(), "Storage unavailable: private mode");
        assert!(err.recovery_suggestion().unwrap().contains("memory"));
    }
}
