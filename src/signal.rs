//! Deadline-bounded cancellation signals derived from the caller's token.
//!
//! Cleanup never runs under the caller's own [`CancellationToken`]: after a
//! cancellation that token has already fired and would abort the cleanup
//! before it starts. Each cleanup attempt instead derives a [`DerivedSignal`]
//! with its own deadline.

use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Upper bound for deadlines so that `Instant` arithmetic cannot overflow.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// A cancellation signal owned by the engine.
///
/// Fires when its own deadline elapses, or, if linked to a parent, once the
/// parent is cancelled and the grace window (measured from derivation) has
/// passed. A parent that is already cancelled therefore still leaves the
/// holder a bounded window instead of none.
#[derive(Debug, Clone)]
pub(crate) struct DerivedSignal {
    parent: Option<CancellationToken>,
    started: Instant,
    deadline: Instant,
    grace_end: Instant,
}

impl DerivedSignal {
    /// A signal governed only by `timeout`.
    pub(crate) fn detached(timeout: Duration) -> Self {
        let started = Instant::now();
        let deadline = offset(started, timeout);
        Self {
            parent: None,
            started,
            deadline,
            grace_end: deadline,
        }
    }

    /// A signal that fires after `timeout`, or after `grace` once `parent`
    /// is cancelled, whichever comes first.
    pub(crate) fn linked(parent: &CancellationToken, timeout: Duration, grace: Duration) -> Self {
        let started = Instant::now();
        Self {
            parent: Some(parent.clone()),
            started,
            deadline: offset(started, timeout),
            grace_end: offset(started, grace),
        }
    }

    /// The budget this signal was derived with.
    pub(crate) fn timeout(&self) -> Duration {
        self.deadline.saturating_duration_since(self.started)
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.parent.is_some()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return true;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.is_cancelled() && now >= self.grace_end)
    }

    /// Completes when the signal fires.
    pub(crate) async fn cancelled(&self) {
        match &self.parent {
            None => sleep_until(self.deadline).await,
            Some(parent) => {
                tokio::select! {
                    () = sleep_until(self.deadline) => {}
                    () = async {
                        parent.cancelled().await;
                        sleep_until(self.grace_end).await;
                    } => {}
                }
            }
        }
    }
}

fn offset(start: Instant, by: Duration) -> Instant {
    start.checked_add(by.min(FAR_FUTURE)).unwrap_or(start)
}
