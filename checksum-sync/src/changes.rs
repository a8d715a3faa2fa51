//! Change detection: decide between a full and an incremental pass.
//!
//! Precedence:
//! 1. `NoPriorState` (no successful run recorded)
//! 2. `ConfigChanged` (algorithm, name-append mode, or output directory differ)
//! 3. `OutputsChanged` (output directory or a recorded artifact is missing)
//! 4. Incremental, with a per-file classification

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use checksum_core::{ChangeKind, ChecksumConfig, InputChange, RunMode};

use crate::artifact;
use crate::state::{InputFingerprints, RunState};

/// Why a run cannot trust the previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullReason {
    NoPriorState,
    Forced,
    ConfigChanged { field: &'static str },
    OutputsChanged { missing: Vec<PathBuf> },
}

impl fmt::Display for FullReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FullReason::NoPriorState => write!(f, "no previous run recorded"),
            FullReason::Forced => write!(f, "full pass requested"),
            FullReason::ConfigChanged { field } => write!(f, "{field} changed since last run"),
            FullReason::OutputsChanged { missing } => write!(
                f,
                "missing {} output(s): {}",
                missing.len(),
                preview_files(missing)
            ),
        }
    }
}

/// Result of change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub mode: RunMode,
    /// Set when `mode` is `Full`.
    pub reason: Option<FullReason>,
}

impl Detection {
    pub fn full(reason: FullReason) -> Self {
        Self {
            mode: RunMode::Full,
            reason: Some(reason),
        }
    }

    fn incremental(changes: Vec<InputChange>) -> Self {
        Self {
            mode: RunMode::Incremental(changes),
            reason: None,
        }
    }
}

/// Compare the previous run with the current configuration and inputs.
pub fn detect(
    previous: Option<&RunState>,
    config: &ChecksumConfig,
    current: &InputFingerprints,
) -> Detection {
    let Some(previous) = previous else {
        return Detection::full(FullReason::NoPriorState);
    };

    if let Some(field) = changed_field(previous, config) {
        return Detection::full(FullReason::ConfigChanged { field });
    }

    let missing = missing_outputs(previous, config);
    if !missing.is_empty() {
        return Detection::full(FullReason::OutputsChanged { missing });
    }

    let keys: BTreeSet<&String> = previous.inputs.keys().chain(current.keys()).collect();
    let changes = keys
        .into_iter()
        .map(|key| {
            let kind = match (previous.inputs.get(key), current.get(key)) {
                (None, Some(_)) => ChangeKind::Added,
                (Some(_), None) => ChangeKind::Removed,
                (Some(before), Some(now)) if before == now => ChangeKind::Unchanged,
                _ => ChangeKind::Modified,
            };
            InputChange::new(PathBuf::from(key), kind)
        })
        .collect();
    Detection::incremental(changes)
}

fn changed_field(previous: &RunState, config: &ChecksumConfig) -> Option<&'static str> {
    if previous.algorithm != config.algorithm {
        Some("algorithm")
    } else if previous.append_name != config.append_name {
        Some("append_name")
    } else if previous.output_dir != config.output_dir {
        Some("output_dir")
    } else {
        None
    }
}

fn missing_outputs(previous: &RunState, config: &ChecksumConfig) -> Vec<PathBuf> {
    if !config.output_dir.is_dir() {
        return vec![config.output_dir.clone()];
    }
    let mut missing: Vec<PathBuf> = previous
        .inputs
        .keys()
        .map(|key| artifact::artifact_path(&config.output_dir, Path::new(key), config.algorithm))
        .filter(|path| !path.is_file())
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

fn preview_files(paths: &[PathBuf]) -> String {
    let mut shown: Vec<String> = paths
        .iter()
        .take(3)
        .map(|p| p.display().to_string())
        .collect();
    if paths.len() > shown.len() {
        shown.push(format!("+{} more", paths.len() - shown.len()));
    }
    shown.join(", ")
}
