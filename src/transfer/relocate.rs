//! Move as copy-then-remove-source.
//!
//! A move that is interrupted after its copy phase can leave both files in
//! place (the partial-move state). That is reported, never hidden: a
//! cancelled source removal is retried once under its own deadline, and a
//! failed one rolls the copy back and surfaces [`Error::RemoveSource`].

use super::{Step, TransferEngine, TransferOutcome, TransferRequest};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use std::io;
use tracing::{info, warn};

impl<F: FileSystem> TransferEngine<F> {
    /// Move `request.source` to `request.destination`.
    ///
    /// Runs [`copy_file`](Self::copy_file) first, which carries its own
    /// cleanup. If the copy did not complete, its outcome is returned as is
    /// and the source is left alone. Otherwise the source is removed under
    /// the caller's cancellation:
    ///
    /// - cancelled: a second, independent removal of the source is attempted
    ///   with the short cancellation deadline, then `Cancelled` is returned.
    ///   The destination is complete; the source may or may not still exist.
    /// - failed: the destination is removed again (rolling the copy back so
    ///   the source stays the only copy) and [`Error::RemoveSource`] is
    ///   returned.
    /// - source already missing: the move counts as complete and the
    ///   destination is kept, since it is now the only copy.
    ///
    /// # Errors
    ///
    /// Everything [`copy_file`](Self::copy_file) returns, plus
    /// [`Error::RemoveSource`] (possibly wrapped in [`Error::Compensation`]
    /// if the rollback failed too) and [`Error::CancelCleanup`] if the
    /// retried source removal failed.
    pub async fn move_file(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        let bytes = match self.copy_file(request).await? {
            TransferOutcome::Completed { bytes } => bytes,
            TransferOutcome::Cancelled => return Ok(TransferOutcome::Cancelled),
        };

        let source = request.source.as_path();
        let step = tokio::select! {
            biased;
            () = request.cancel.cancelled() => Step::Cancelled,
            result = self.fs.remove_file(source) => Step::Done(result),
        };

        match step {
            Step::Done(Ok(())) => {
                info!(
                    from = %source.display(),
                    to = %request.destination.display(),
                    bytes,
                    "move complete"
                );
                Ok(TransferOutcome::Completed { bytes })
            }
            Step::Done(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                // Someone else removed it; the destination is the only copy
                warn!(
                    from = %source.display(),
                    to = %request.destination.display(),
                    "source already gone after copy"
                );
                Ok(TransferOutcome::Completed { bytes })
            }
            Step::Cancelled => {
                warn!(
                    from = %source.display(),
                    "move cancelled after copy; retrying source removal"
                );
                self.clean_up_after_cancel(source).await?;
                Ok(TransferOutcome::Cancelled)
            }
            Step::Done(Err(e)) => {
                warn!(
                    from = %source.display(),
                    error = %e,
                    "cannot remove source; rolling back destination"
                );
                let fault = Error::RemoveSource {
                    path: source.to_path_buf(),
                    source: e,
                };
                Err(self
                    .clean_up_after_fault(&request.destination, &request.cancel, fault)
                    .await)
            }
        }
    }
}
