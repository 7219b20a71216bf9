use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::lock::LockError;

/// Machine-readable error codes for scripts and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoStoreLocation,
    ConfigParseError,
    IndexOutOfRange,
    CorruptStore,
    ForeignDocument,
    UnsupportedVersion,
    StoreWriteFailed,
    LockContention,
    StoreReadFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoStoreLocation => "E1001",
            Self::ConfigParseError => "E1002",
            Self::IndexOutOfRange => "E2001",
            Self::CorruptStore => "E3001",
            Self::ForeignDocument => "E3002",
            Self::UnsupportedVersion => "E3003",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::StoreReadFailed => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoStoreLocation => "Store has no durable location",
            Self::ConfigParseError => "Config file parse error",
            Self::IndexOutOfRange => "Index out of range",
            Self::CorruptStore => "Store file is corrupt",
            Self::ForeignDocument => "Store file is not a ticklist document",
            Self::UnsupportedVersion => "Store file format is too new",
            Self::StoreWriteFailed => "Store file write failed",
            Self::LockContention => "Lock contention",
            Self::StoreReadFailed => "Store file read failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NoStoreLocation => Some("Open the store with a file path before saving."),
            Self::ConfigParseError => Some("Fix syntax in ~/.config/ticklist/config.toml and retry."),
            Self::IndexOutOfRange => Some("Run `tl list` to see valid indices."),
            Self::CorruptStore => {
                Some("Restore the file from a backup, or move it aside to start empty.")
            }
            Self::ForeignDocument => Some("Point --file at a ticklist store, not another JSON file."),
            Self::UnsupportedVersion => Some("Upgrade ticklist to read this file."),
            Self::StoreWriteFailed => {
                Some("Check that the directory exists, disk space, and write permissions.")
            }
            Self::LockContention => Some("Retry after the other `tl` process releases its lock."),
            Self::StoreReadFailed => Some("Check read permissions on the store file."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure to read, write, or make sense of the durable location.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The store was created without a durable location.
    #[error("store has no durable location")]
    NoLocation,

    /// Reading the store file failed for a reason other than absence.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing, syncing, or renaming the store file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not valid document JSON.
    #[error("{} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is JSON but carries another format marker.
    #[error("{} is not a ticklist document (format marker {found:?})", .path.display())]
    Foreign { path: PathBuf, found: String },

    /// The file was written by a newer format version.
    #[error("{} uses format version {version}, newest supported is {supported}", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        version: u32,
        supported: u32,
    },

    /// Serializing the in-memory list failed.
    #[error("failed to encode store document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The advisory lock next to the store file could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),
}

impl PersistenceError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoLocation => ErrorCode::NoStoreLocation,
            Self::Read { .. } => ErrorCode::StoreReadFailed,
            Self::Write { .. } => ErrorCode::StoreWriteFailed,
            Self::Corrupt { .. } => ErrorCode::CorruptStore,
            Self::Foreign { .. } => ErrorCode::ForeignDocument,
            Self::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            Self::Encode(_) => ErrorCode::InternalUnexpected,
            Self::Lock(err) => err.code(),
        }
    }
}

/// Every failure a [`crate::store::TodoStore`] operation can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An index outside `[0, count)` was addressed. Nothing changed.
    #[error("index {index} is out of range for a list of {count} item(s)")]
    OutOfRange { index: usize, count: usize },

    /// Save or load failed. The in-memory list is unchanged.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::Persistence(err) => err.code(),
        }
    }

    /// Remediation hint for the user, if one applies.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// Returns `true` for [`StoreError::OutOfRange`].
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, PersistenceError, StoreError};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::NoStoreLocation,
            ErrorCode::ConfigParseError,
            ErrorCode::IndexOutOfRange,
            ErrorCode::CorruptStore,
            ErrorCode::ForeignDocument,
            ErrorCode::UnsupportedVersion,
            ErrorCode::StoreWriteFailed,
            ErrorCode::LockContention,
            ErrorCode::StoreReadFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::IndexOutOfRange.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn out_of_range_message_names_index_and_count() {
        let err = StoreError::OutOfRange { index: 7, count: 2 };
        assert_eq!(err.to_string(), "index 7 is out of range for a list of 2 item(s)");
        assert_eq!(err.code(), ErrorCode::IndexOutOfRange);
        assert!(err.is_out_of_range());
    }

    #[test]
    fn persistence_error_is_transparent_through_store_error() {
        let err = StoreError::from(PersistenceError::NoLocation);
        assert_eq!(err.to_string(), "store has no durable location");
        assert_eq!(err.code(), ErrorCode::NoStoreLocation);
        assert!(err.hint().is_some());
        assert!(!err.is_out_of_range());
    }
}
