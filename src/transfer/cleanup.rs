//! Bounded cleanup of partial output.
//!
//! Every cleanup runs under a freshly derived [`DerivedSignal`], never the
//! caller's token, so a cancelled transfer can still clean up after itself.
//! Running out of time is not an error: the attempt is logged and the path
//! is left as it is. Any other removal failure is handed back to the call
//! site, which reports it next to the outcome that triggered the cleanup.

use super::TransferEngine;
use crate::error::Error;
use crate::fs::FileSystem;
use crate::signal::DerivedSignal;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How a cleanup attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CleanupOutcome {
    Deleted,
    NotFound,
    TimedOut,
}

/// One cleanup try. Lives only as long as the attempt and is logged, never
/// returned to the caller.
struct CleanupAttempt<'a> {
    target: &'a Path,
    deadline: Duration,
    outcome: CleanupOutcome,
}

impl CleanupAttempt<'_> {
    fn record(&self, elapsed: Duration, linked: bool) {
        let target = self.target.display();
        match self.outcome {
            CleanupOutcome::Deleted => {
                debug!(path = %target, ?elapsed, "removed partial output");
            }
            CleanupOutcome::NotFound => {
                debug!(path = %target, "nothing to clean up");
            }
            CleanupOutcome::TimedOut => {
                warn!(
                    path = %target,
                    deadline = ?self.deadline,
                    linked,
                    "cleanup did not finish in time; partial output may remain"
                );
            }
        }
    }
}

impl<F: FileSystem> TransferEngine<F> {
    /// Remove `path`, giving up once `signal` fires.
    ///
    /// A missing path counts as success. Expiry of `signal` yields
    /// [`CleanupOutcome::TimedOut`]. The removal itself may keep running on
    /// the blocking pool after a timeout, but it is no longer awaited.
    ///
    /// # Errors
    ///
    /// Any removal failure other than `NotFound`.
    pub(crate) async fn bounded_delete(
        &self,
        path: &Path,
        signal: DerivedSignal,
    ) -> io::Result<CleanupOutcome> {
        let started = Instant::now();

        let outcome = if signal.is_cancelled() {
            CleanupOutcome::TimedOut
        } else {
            tokio::select! {
                biased;
                result = self.fs.remove_file(path) => match result {
                    Ok(()) => CleanupOutcome::Deleted,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => CleanupOutcome::NotFound,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "cleanup failed");
                        return Err(e);
                    }
                },
                () = signal.cancelled() => CleanupOutcome::TimedOut,
            }
        };

        let attempt = CleanupAttempt {
            target: path,
            deadline: signal.timeout(),
            outcome,
        };
        attempt.record(started.elapsed(), signal.is_linked());
        Ok(outcome)
    }

    /// Cleanup after the caller cancelled: short, independent deadline.
    ///
    /// # Errors
    ///
    /// [`Error::CancelCleanup`] if the removal failed outright, because a
    /// partial file left behind must not pass for a clean cancellation.
    pub(crate) async fn clean_up_after_cancel(&self, path: &Path) -> Result<(), Error> {
        let signal = DerivedSignal::detached(self.options.cancel_cleanup_timeout);
        match self.bounded_delete(path, signal).await {
            Ok(_) => Ok(()),
            Err(source) => Err(Error::CancelCleanup {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Cleanup after a fault, returning the error to report.
    ///
    /// The deadline is longer and linked to `cancel`: if the caller cancels
    /// while the cleanup runs, it is cut down to the cancellation budget.
    /// The returned error is `fault` itself unless the removal failed, in
    /// which case both are wrapped in [`Error::Compensation`].
    pub(crate) async fn clean_up_after_fault(
        &self,
        path: &Path,
        cancel: &CancellationToken,
        fault: Error,
    ) -> Error {
        let signal = DerivedSignal::linked(
            cancel,
            self.options.fault_cleanup_timeout,
            self.options.cancel_cleanup_timeout,
        );
        match self.bounded_delete(path, signal).await {
            Ok(_) => fault,
            Err(cleanup) => fault.with_failed_cleanup(path, cleanup),
        }
    }
}
