//! # checksum-sync
//!
//! Incremental checksum artifact generation.
//!
//! Call [`pipeline::run`] to bring an output directory of `<name>.<ext>`
//! checksum files in line with a [`ChecksumConfig`](checksum_core::ChecksumConfig),
//! or drive [`reconcile`] directly with a change set from another oracle.

pub mod artifact;
pub mod changes;
pub mod error;
pub mod hasher;
pub mod inputs;
pub mod pipeline;
pub mod reconcile;
pub mod state;
pub mod writer;

pub use changes::{Detection, FullReason};
pub use error::SyncError;
pub use pipeline::{RunOptions, RunOutcome};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileReport};
pub use writer::ArtifactAction;
