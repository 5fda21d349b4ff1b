//! # guardcopy
//!
//! Cancellation-safe file copy and move for async Rust.
//!
//! ## Core Features
//!
//! - **No half-written files**: a cancelled or failed copy removes the
//!   partial destination before returning
//! - **Bounded cleanup**: that removal runs under its own deadline (3 s after
//!   a cancellation, 10 s after a fault) and never hangs the caller
//! - **Original error preserved**: cleanup never replaces the fault that
//!   triggered it; a failed cleanup is reported alongside it
//! - **Cancellation is a result**: [`TransferOutcome::Cancelled`] is distinct
//!   from both success and failure
//! - **No accidental overwrite**: the destination is opened with
//!   exclusive-create; replacing a file requires `overwrite`
//! - **Safe move**: copy, then remove the source, with the same cleanup
//!   discipline around the removal
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use guardcopy::TransferBuilder;
//!
//! # async fn run() -> guardcopy::Result<()> {
//! let outcome = TransferBuilder::new("download.part", "library/file.bin")
//!     .overwrite()
//!     .relocate()
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use guardcopy::{TransferOutcome, copy_file};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> guardcopy::Result<()> {
//! let cancel = CancellationToken::new();
//! // Hand `cancel.clone()` to whatever may abort the copy
//! match copy_file("in.bin", "out.bin", false, &cancel).await? {
//!     TransferOutcome::Completed { bytes } => println!("{bytes} bytes"),
//!     TransferOutcome::Cancelled => println!("cancelled, out.bin removed"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Engine API
//!
//! [`TransferEngine`] runs requests over any [`FileSystem`], which is also
//! how the cleanup paths are tested without a misbehaving disk.
//!
//! ## What a return value guarantees
//!
//! | Result | Destination |
//! |--------|-------------|
//! | `Ok(Completed)` | complete copy of the source |
//! | `Ok(Cancelled)` | absent, or left over only if cleanup ran out of time (logged) |
//! | `Err(e)` | absent, unless `e.is_compensation_failure()` |
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialize/Deserialize for [`TransferOptions`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod error;
mod fs;
mod options;
mod signal;
mod transfer;


pub use builder::TransferBuilder;
pub use error::{Error, ErrorCode, Result, is_no_space_error};
pub use fs::{FileSystem, LocalFs};
pub use options::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CANCEL_CLEANUP_TIMEOUT, DEFAULT_FAULT_CLEANUP_TIMEOUT,
    MIN_BUFFER_SIZE, TransferOptions,
};
pub use transfer::{TransferEngine, TransferOutcome, TransferRequest, copy_file, move_file};

pub use tokio_util::sync::CancellationToken;
