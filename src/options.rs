//! Configuration options for transfers.
//!
//! # Example
//!
//! ```
//! use guardcopy::TransferOptions;
//! use std::time::Duration;
//!
//! let options = TransferOptions::default()
//!     .with_buffer_size(1024 * 1024)
//!     .with_fault_cleanup_timeout(Duration::from_secs(30))
//!     .without_fsync();
//! ```

use std::time::Duration;

/// Default stream buffer, sized for sequential throughput.
pub const DEFAULT_BUFFER_SIZE: usize = 160 * 1024;

/// Smallest accepted stream buffer.
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

/// Default cleanup deadline after a cancellation.
pub const DEFAULT_CANCEL_CLEANUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Default cleanup deadline after a fault.
pub const DEFAULT_FAULT_CLEANUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for copy and move operations.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `buffer_size` | 160 KiB | Stream buffer size |
/// | `cancel_cleanup_timeout` | 3 s | Cleanup budget after cancellation |
/// | `fault_cleanup_timeout` | 10 s | Cleanup budget after a fault |
/// | `fsync` | `true` | Sync destination before reporting success |
///
/// Cleanup after a cancellation is kept short so the caller is not held
/// noticeably longer than the cancellation itself. Cleanup after a fault
/// gets more time, since debris left after a real fault is worse than a few
/// extra seconds of latency.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferOptions {
    /// Size of the buffer used to stream bytes (default: 160 KiB)
    ///
    /// A performance knob only. Clamped to at least [`MIN_BUFFER_SIZE`].
    pub buffer_size: usize,

    /// Deadline for removing partial output after a cancellation (default: 3 s)
    ///
    /// Also the grace window a fault-path cleanup keeps when the caller
    /// cancels while it runs.
    pub cancel_cleanup_timeout: Duration,

    /// Deadline for removing partial output after a fault (default: 10 s)
    pub fault_cleanup_timeout: Duration,

    /// Whether to sync the destination to disk before success (default: true)
    pub fsync: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            cancel_cleanup_timeout: DEFAULT_CANCEL_CLEANUP_TIMEOUT,
            fault_cleanup_timeout: DEFAULT_FAULT_CLEANUP_TIMEOUT,
            fsync: true,
        }
    }
}

impl TransferOptions {
    /// Set the stream buffer size
    ///
    /// Values below [`MIN_BUFFER_SIZE`] are raised to it.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    /// Set the cleanup deadline used after a cancellation
    #[must_use]
    pub fn with_cancel_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.cancel_cleanup_timeout = timeout;
        self
    }

    /// Set the cleanup deadline used after a fault
    #[must_use]
    pub fn with_fault_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.fault_cleanup_timeout = timeout;
        self
    }

    /// Skip the final sync for faster (but less durable) transfers
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    pub(crate) fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(MIN_BUFFER_SIZE)
    }
}
