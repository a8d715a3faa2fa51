//! Checksum core library — domain types, task configuration, errors.
//!
//! - [`types`] — algorithms, change classification, run configuration
//! - [`error`] — [`ConfigError`]
//! - [`config`] — `checksum.yaml` load / save

pub mod config;
pub mod error;
pub mod types;

pub use config::ConfigFile;
pub use error::ConfigError;
pub use types::{Algorithm, ChangeKind, ChecksumConfig, InputChange, RunMode, RunModeKind};
