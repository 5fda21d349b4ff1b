//! Builder API for ergonomic transfers.
//!
//! The builder pattern provides a fluent interface for configuring and
//! running a single copy or move. It is often more convenient than building
//! a [`TransferRequest`] and [`TransferOptions`] by hand.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use guardcopy::TransferBuilder;
//!
//! # async fn run() -> guardcopy::Result<()> {
//! let outcome = TransferBuilder::new("in.bin", "out.bin").copy().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellable Move
//!
//! ```no_run
//! use guardcopy::TransferBuilder;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> guardcopy::Result<()> {
//! let cancel = CancellationToken::new();
//! let outcome = TransferBuilder::new("incoming/file.iso", "library/file.iso")
//!     .overwrite()
//!     .cancel_token(cancel.clone())
//!     .fault_cleanup_timeout(Duration::from_secs(30))
//!     .relocate()
//!     .await?;
//!
//! if outcome.is_cancelled() {
//!     eprintln!("move was cancelled");
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::options::TransferOptions;
use crate::transfer::{TransferEngine, TransferOutcome, TransferRequest};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A builder for configuring and running one transfer.
///
/// Defaults: no overwrite, a cancellation token nobody cancels, and
/// [`TransferOptions::default`].
#[derive(Debug, Clone)]
pub struct TransferBuilder {
    request: TransferRequest,
    options: TransferOptions,
}

impl TransferBuilder {
    /// Create a builder for moving or copying `src` to `dst`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            request: TransferRequest::new(src, dst),
            options: TransferOptions::default(),
        }
    }

    /// Replace an existing destination.
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.request.overwrite = true;
        self
    }

    /// Observe `token` for cancellation.
    ///
    /// Cancelling stops the transfer, removes partial output and makes the
    /// call return [`TransferOutcome::Cancelled`].
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.request.cancel = token;
        self
    }

    /// Set the stream buffer size.
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options = self.options.with_buffer_size(size);
        self
    }

    /// Disable the final sync.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Set the cleanup deadline used after a cancellation.
    #[must_use]
    pub fn cancel_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_cancel_cleanup_timeout(timeout);
        self
    }

    /// Set the cleanup deadline used after a fault.
    #[must_use]
    pub fn fault_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_fault_cleanup_timeout(timeout);
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the configured options.
    pub fn get_options(&self) -> &TransferOptions {
        &self.options
    }

    /// Get the configured request.
    pub fn get_request(&self) -> &TransferRequest {
        &self.request
    }

    /// Run the transfer as a copy.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::copy_file`].
    pub async fn copy(self) -> Result<TransferOutcome> {
        TransferEngine::new(self.options)
            .copy_file(&self.request)
            .await
    }

    /// Run the transfer as a move.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::move_file`].
    pub async fn relocate(self) -> Result<TransferOutcome> {
        TransferEngine::new(self.options)
            .move_file(&self.request)
            .await
    }
}
