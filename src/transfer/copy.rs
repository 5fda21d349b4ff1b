//! Single file copy with compensation.

use super::{Step, TransferEngine, TransferOutcome, TransferRequest};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use std::io;
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

impl<F: FileSystem> TransferEngine<F> {
    /// Copy `request.source` to `request.destination`.
    ///
    /// The destination is created with exclusive-create, so an existing file
    /// is never overwritten unless `request.overwrite` removed it first.
    ///
    /// On return the destination is either complete (`Completed`), absent
    /// (`Cancelled` or an error), or, only when the cleanup itself failed,
    /// partial with [`Error::Compensation`] / [`Error::CancelCleanup`]
    /// returned. A destination this call did not create is never removed.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyExists`] if the destination exists and overwrite is off
    /// - [`Error::SourceNotFound`] / [`Error::IsADirectory`] for a bad source
    /// - [`Error::ClearDestination`] if the old destination cannot be removed
    /// - [`Error::Transfer`] / [`Error::NoSpace`] / [`Error::Finalize`] for
    ///   IO faults while writing
    /// - [`Error::Compensation`] / [`Error::CancelCleanup`] if cleanup failed
    pub async fn copy_file(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        let destination = request.destination.as_path();

        // Nothing on disk belongs to this call yet, so this phase may be
        // abandoned at any point.
        let step = tokio::select! {
            biased;
            () = request.cancel.cancelled() => Step::Cancelled,
            result = self.prepare(request) => Step::Done(result),
        };
        let reader = match step {
            Step::Done(Ok(reader)) => reader,
            Step::Done(Err(fault)) => {
                warn!(to = %destination.display(), error = %fault, "copy failed");
                return Err(fault);
            }
            Step::Cancelled => {
                warn!(to = %destination.display(), "copy cancelled before start");
                return Ok(TransferOutcome::Cancelled);
            }
        };

        // Not raced: the file may exist before the open call returns, and
        // it has to be owned here before a cancellation can be honoured.
        let mut writer = self
            .fs
            .create_new(destination)
            .await
            .map_err(|e| create_destination_error(destination, e))?;
        debug!(from = %request.source.display(), to = %destination.display(), "streaming");

        let step = if request.cancel.is_cancelled() {
            Step::Cancelled
        } else {
            tokio::select! {
                biased;
                () = request.cancel.cancelled() => Step::Cancelled,
                result = self.stream(request, reader, &mut writer) => Step::Done(result),
            }
        };
        self.release(destination, writer).await;

        match step {
            Step::Done(Ok(bytes)) => {
                info!(
                    from = %request.source.display(),
                    to = %destination.display(),
                    bytes,
                    "copy complete"
                );
                Ok(TransferOutcome::Completed { bytes })
            }
            Step::Cancelled => {
                warn!(to = %destination.display(), "copy cancelled");
                self.clean_up_after_cancel(destination).await?;
                Ok(TransferOutcome::Cancelled)
            }
            Step::Done(Err(fault)) => {
                warn!(to = %destination.display(), error = %fault, "copy failed");
                Err(self
                    .clean_up_after_fault(destination, &request.cancel, fault)
                    .await)
            }
        }
    }

    /// Remove an existing destination when overwriting is allowed.
    ///
    /// Runs inside the caller's cancellation scope: cancelling here cancels
    /// the whole copy. A destination that vanished in the meantime is fine.
    pub(crate) async fn pre_clear(&self, path: &Path, overwrite: bool) -> Result<()> {
        if !overwrite {
            return Ok(());
        }

        let clear_err = |source| Error::ClearDestination {
            path: path.to_path_buf(),
            source,
        };
        if !self.fs.exists(path).await.map_err(clear_err)? {
            return Ok(());
        }

        debug!(path = %path.display(), "removing existing destination");
        match self.fs.remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(clear_err(e)),
        }
    }

    /// PreClear, then open the source.
    async fn prepare(&self, request: &TransferRequest) -> Result<F::Reader> {
        self.pre_clear(&request.destination, request.overwrite)
            .await?;
        self.fs
            .open_read(&request.source)
            .await
            .map_err(|e| open_source_error(&request.source, e))
    }

    /// Stream, flush and optionally sync into `writer`.
    async fn stream(
        &self,
        request: &TransferRequest,
        reader: F::Reader,
        writer: &mut F::Writer,
    ) -> Result<u64> {
        let source = request.source.as_path();
        let destination = request.destination.as_path();

        let mut reader = BufReader::with_capacity(self.options.effective_buffer_size(), reader);
        let bytes = tokio::io::copy_buf(&mut reader, writer)
            .await
            .map_err(|e| Error::transfer(source, destination, e))?;

        let finalize_err = |source| Error::Finalize {
            path: destination.to_path_buf(),
            source,
        };
        writer.flush().await.map_err(finalize_err)?;
        if self.options.fsync {
            self.fs.sync(writer).await.map_err(finalize_err)?;
        }

        Ok(bytes)
    }

    /// Close the destination before anything else touches it. Waiting for
    /// an in-flight write is bounded by the cancellation cleanup budget.
    async fn release(&self, destination: &Path, writer: F::Writer) {
        let budget = self.options.cancel_cleanup_timeout;
        if tokio::time::timeout(budget, self.fs.close(writer))
            .await
            .is_err()
        {
            warn!(
                path = %destination.display(),
                ?budget,
                "destination still busy; cleaning up anyway"
            );
        }
    }
}

fn open_source_error(path: &Path, source: io::Error) -> Error {
    match source.kind() {
        io::ErrorKind::NotFound => Error::SourceNotFound(path.to_path_buf()),
        io::ErrorKind::IsADirectory => Error::IsADirectory(path.to_path_buf()),
        _ => Error::OpenSource {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn create_destination_error(path: &Path, source: io::Error) -> Error {
    if source.kind() == io::ErrorKind::AlreadyExists {
        Error::AlreadyExists(path.to_path_buf())
    } else {
        Error::CreateDestination {
            path: path.to_path_buf(),
            source,
        }
    }
}
