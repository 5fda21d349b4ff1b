//! The transfer engine: copy and move with compensation.
//!
//! A copy runs as one sequential chain:
//!
//! ```text
//! pre-clear -> open source -> create destination -> stream -> flush/sync
//! ```
//!
//! all raced against the caller's [`CancellationToken`]. If the chain is
//! cancelled or fails after the destination was created, the partial file is
//! removed by a bounded cleanup running under its own deadline. A move is a
//! completed copy followed by removal of the source, with the same
//! discipline applied to that removal.

mod cleanup;
mod copy;
mod relocate;

use crate::error::Result;
use crate::fs::{FileSystem, LocalFs};
use crate::options::TransferOptions;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// A single copy or move request.
///
/// The engine only reads the request. `cancel` stays owned by the caller,
/// who may clone it and cancel from anywhere.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// File to read from
    pub source: PathBuf,
    /// File to create
    pub destination: PathBuf,
    /// Remove an existing destination before copying
    pub overwrite: bool,
    /// Caller's cancellation signal
    pub cancel: CancellationToken,
}

impl TransferRequest {
    /// A request with `overwrite` off and a token nobody cancels.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            overwrite: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Set whether an existing destination is replaced
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Observe `token` for cancellation
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

/// How a transfer ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a cancelled transfer did not produce the destination"]
pub enum TransferOutcome {
    /// The destination is complete
    Completed {
        /// Bytes written to the destination
        bytes: u64,
    },
    /// The caller cancelled; partial output has been cleaned up
    Cancelled,
}

impl TransferOutcome {
    /// Whether the transfer ran to completion.
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether the transfer was cancelled.
    #[must_use]
    pub fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Bytes written, if the transfer completed.
    #[must_use]
    pub fn bytes(self) -> Option<u64> {
        match self {
            Self::Completed { bytes } => Some(bytes),
            Self::Cancelled => None,
        }
    }
}

/// Result of racing a step against cancellation.
enum Step<T> {
    Done(T),
    Cancelled,
}

/// Performs copies and moves over a [`FileSystem`].
///
/// The engine holds no per-transfer state. Any number of transfers may run
/// through one instance concurrently, and any two instances with equal
/// options behave identically.
#[derive(Debug, Clone, Default)]
pub struct TransferEngine<F = LocalFs> {
    fs: F,
    options: TransferOptions,
}

impl TransferEngine<LocalFs> {
    /// An engine over the local filesystem.
    #[must_use]
    pub fn new(options: TransferOptions) -> Self {
        Self::with_fs(LocalFs, options)
    }
}

impl<F: FileSystem> TransferEngine<F> {
    /// An engine over a custom filesystem.
    #[must_use]
    pub fn with_fs(fs: F, options: TransferOptions) -> Self {
        Self { fs, options }
    }

    /// The options this engine was built with.
    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// The filesystem this engine operates on.
    pub fn fs(&self) -> &F {
        &self.fs
    }
}

/// Copy `source` to `destination` on the local filesystem.
///
/// Returns [`TransferOutcome::Cancelled`] if `cancel` fires before the copy
/// completes; any partial destination is removed first. See
/// [`TransferEngine::copy_file`].
///
/// # Errors
///
/// Fails if the destination exists and `overwrite` is false
/// ([`Error::AlreadyExists`](crate::Error::AlreadyExists)), or on any IO
/// fault. Faults are reported after the partial destination was cleaned up.
///
/// # Example
///
/// ```no_run
/// use guardcopy::{TransferOutcome, copy_file};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> guardcopy::Result<()> {
/// let cancel = CancellationToken::new();
/// match copy_file("in.bin", "out.bin", false, &cancel).await? {
///     TransferOutcome::Completed { bytes } => println!("copied {bytes} bytes"),
///     TransferOutcome::Cancelled => println!("cancelled"),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    overwrite: bool,
    cancel: &CancellationToken,
) -> Result<TransferOutcome> {
    let request = TransferRequest::new(source, destination)
        .with_overwrite(overwrite)
        .with_cancel_token(cancel.clone());
    TransferEngine::new(TransferOptions::default()).copy_file(&request).await
}

/// Move `source` to `destination` on the local filesystem.
///
/// Always copies then removes the source, even within one filesystem. See
/// [`TransferEngine::move_file`].
///
/// # Errors
///
/// Everything [`copy_file`] can fail with, plus
/// [`Error::RemoveSource`](crate::Error::RemoveSource) when the source
/// cannot be removed after a successful copy.
pub async fn move_file<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    overwrite: bool,
    cancel: &CancellationToken,
) -> Result<TransferOutcome> {
    let request = TransferRequest::new(source, destination)
        .with_overwrite(overwrite)
        .with_cancel_token(cancel.clone());
    TransferEngine::new(TransferOptions::default()).move_file(&request).await
}
