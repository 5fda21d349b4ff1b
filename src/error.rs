//! Error types for guardcopy.
//!
//! This module provides the [`Error`] enum containing every fault a copy or
//! move can raise, the [`Result`] type alias, and [`ErrorCode`] for
//! machine-readable reporting.
//!
//! Cancellation is deliberately absent from this enum: a cancelled transfer
//! returns [`TransferOutcome::Cancelled`](crate::TransferOutcome::Cancelled).
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Setup | [`Error::SourceNotFound`], [`Error::IsADirectory`], [`Error::AlreadyExists`], [`Error::ClearDestination`] |
//! | Transfer | [`Error::OpenSource`], [`Error::CreateDestination`], [`Error::Transfer`], [`Error::NoSpace`], [`Error::Finalize`] |
//! | Move | [`Error::RemoveSource`] |
//! | Compensation | [`Error::Compensation`], [`Error::CancelCleanup`] |

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for guardcopy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
///
/// # Example
///
/// ```
/// use std::io;
/// use guardcopy::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == libc::ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Stable, machine-readable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Caller supplied something unusable
    InvalidInput,
    /// Source path does not exist
    SourceNotFound,
    /// Destination exists and overwrite was not requested
    AlreadyExists,
    /// Access was refused by the filesystem
    PermissionDenied,
    /// Destination storage is full
    NoSpace,
    /// Any other IO failure
    IoError,
    /// Cleanup of a partial file failed after the primary outcome
    CompensationFailed,
    /// Bug or unexpected internal state
    Internal,
}

impl ErrorCode {
    /// The code as a `snake_case` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::SourceNotFound => "source_not_found",
            Self::AlreadyExists => "already_exists",
            Self::PermissionDenied => "permission_denied",
            Self::NoSpace => "no_space",
            Self::IoError => "io_error",
            Self::CompensationFailed => "compensation_failed",
            Self::Internal => "internal",
        }
    }

    /// Classify a raw IO error.
    #[must_use]
    pub fn from_io(error: &io::Error) -> Self {
        if is_no_space_error(error) {
            return Self::NoSpace;
        }
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            _ => Self::IoError,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during copy and move operations.
///
/// Every variant carries the path it concerns. Faults raised after the
/// destination was created have already been compensated: the partial
/// destination was removed, or the removal timed out and was logged. When
/// the removal itself failed, the fault is wrapped in
/// [`Error::Compensation`] so the original cause is never lost.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source is a directory; only regular files are transferred
    #[error("Source is a directory: {0}")]
    IsADirectory(PathBuf),

    /// Destination already exists and overwrite was not requested
    #[error("Destination already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Failed to remove a pre-existing destination before copying
    #[error("Failed to clear existing destination {path}: {source}")]
    ClearDestination {
        /// Destination that could not be cleared
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to open the source for reading
    #[error("Failed to open source {path}: {source}")]
    OpenSource {
        /// Source path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to create the destination
    #[error("Failed to create destination {path}: {source}")]
    CreateDestination {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Streaming bytes from source to destination failed
    #[error("Failed to copy {from} to {to}: {source}")]
    Transfer {
        /// Source path
        from: PathBuf,
        /// Destination path
        to: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// No space left on the destination device
    #[error("No space left on device while writing {path}")]
    NoSpace {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Flushing or syncing the completed destination failed
    #[error("Failed to finalize destination {path}: {source}")]
    Finalize {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The copy phase of a move succeeded but the source could not be removed
    ///
    /// The destination has been rolled back (removed) so the source remains
    /// the only copy.
    #[error("Failed to remove source {path} after copying: {source}")]
    RemoveSource {
        /// Source path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// A fault occurred and the cleanup that followed it also failed
    ///
    /// `primary` is the original fault. `path` may still hold a partial file.
    #[error("{primary}; cleanup of {path} also failed: {cleanup}")]
    Compensation {
        /// The fault that triggered cleanup
        #[source]
        primary: Box<Error>,
        /// Path the cleanup tried to remove
        path: PathBuf,
        /// Why the cleanup failed
        cleanup: io::Error,
    },

    /// The transfer was cancelled but removing its partial output failed
    #[error("Transfer cancelled; cleanup of {path} failed: {source}")]
    CancelCleanup {
        /// Path the cleanup tried to remove
        path: PathBuf,
        /// Why the cleanup failed
        source: io::Error,
    },
}

impl Error {
    /// Build a [`Error::Transfer`], promoting storage-full errors to
    /// [`Error::NoSpace`].
    pub(crate) fn transfer(from: &Path, to: &Path, source: io::Error) -> Self {
        if is_no_space_error(&source) {
            Self::NoSpace {
                path: to.to_path_buf(),
                source,
            }
        } else {
            Self::Transfer {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            }
        }
    }

    /// Wrap `self` together with a failed cleanup of `path`.
    pub(crate) fn with_failed_cleanup(self, path: &Path, cleanup: io::Error) -> Self {
        Self::Compensation {
            primary: Box::new(self),
            path: path.to_path_buf(),
            cleanup,
        }
    }

    /// The fault that started the failure, looking through compensation
    /// wrappers.
    #[must_use]
    pub fn primary(&self) -> &Error {
        match self {
            Self::Compensation { primary, .. } => primary.primary(),
            other => other,
        }
    }

    /// Whether a cleanup step failed, which means a partial file may remain.
    #[must_use]
    pub fn is_compensation_failure(&self) -> bool {
        matches!(self, Self::Compensation { .. } | Self::CancelCleanup { .. })
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SourceNotFound(_) => ErrorCode::SourceNotFound,
            Self::IsADirectory(_) => ErrorCode::InvalidInput,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::NoSpace { .. } => ErrorCode::NoSpace,
            Self::ClearDestination { source, .. }
            | Self::OpenSource { source, .. }
            | Self::CreateDestination { source, .. }
            | Self::Transfer { source, .. }
            | Self::Finalize { source, .. }
            | Self::RemoveSource { source, .. } => ErrorCode::from_io(source),
            Self::Compensation { .. } | Self::CancelCleanup { .. } => {
                ErrorCode::CompensationFailed
            }
        }
    }
}
