//! Domain types for checksum generation.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Digest function used to produce checksum artifacts.
///
/// The selected algorithm is itself a tracked input: artifacts are only valid
/// for the algorithm that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Md5,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Md5,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
    ];

    /// File extension (without the dot) of artifacts produced by this algorithm.
    pub fn extension(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Look up the algorithm owning a managed extension (`"sha256"`, ...).
    pub fn from_extension(ext: &str) -> Option<Algorithm> {
        Algorithm::ALL.into_iter().find(|a| a.extension() == ext)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            "sha384" | "sha-384" => Ok(Algorithm::Sha384),
            "sha512" | "sha-512" => Ok(Algorithm::Sha512),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Change classification
// ---------------------------------------------------------------------------

/// How an input file changed relative to the previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Unchanged,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Removed => write!(f, "removed"),
            ChangeKind::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A single `(file, change)` entry of an incremental change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl InputChange {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Run mode selected once per invocation.
///
/// `Full` purges every managed artifact and regenerates from the configured
/// file set; `Incremental` only acts on the supplied change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Full,
    Incremental(Vec<InputChange>),
}

impl RunMode {
    pub fn is_incremental(&self) -> bool {
        matches!(self, RunMode::Incremental(_))
    }

    pub fn kind(&self) -> RunModeKind {
        match self {
            RunMode::Full => RunModeKind::Full,
            RunMode::Incremental(_) => RunModeKind::Incremental,
        }
    }
}

/// Payload-free tag of a [`RunMode`], for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunModeKind {
    Full,
    Incremental,
}

impl fmt::Display for RunModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunModeKind::Full => write!(f, "full"),
            RunModeKind::Incremental => write!(f, "incremental"),
        }
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Immutable configuration for one checksum run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumConfig {
    /// Directory receiving `<name>.<ext>` artifacts. Shared with other producers.
    pub output_dir: PathBuf,
    pub algorithm: Algorithm,
    /// Write `"<digest>  <name>"` instead of the bare digest.
    pub append_name: bool,
    /// Input files and directories, before flattening.
    pub files: Vec<PathBuf>,
}

impl ChecksumConfig {
    pub fn new(output_dir: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            algorithm: Algorithm::default(),
            append_name: false,
            files,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_append_name(mut self, append_name: bool) -> Self {
        self.append_name = append_name;
        self
    }

    /// Reject an output location that exists but is not a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.output_dir.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
