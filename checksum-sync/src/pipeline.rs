//! Shared run entrypoint used by the CLI.
//!
//! `run` chains the pieces in order: validate → resolve inputs → load state →
//! detect changes → invalidate state → reconcile → save state. The state file
//! is removed before any artifact is touched and only rewritten once the
//! reconciliation succeeded, so a failed run is always followed by a full one.

use std::path::{Path, PathBuf};

use checksum_core::{ChecksumConfig, RunMode};

use crate::changes::{self, Detection, FullReason};
use crate::error::SyncError;
use crate::inputs;
use crate::reconcile::{self, reconcile, ReconcileOptions, ReconcileReport};
use crate::state::{self, InputFingerprints, RunState};

/// Caller switches for a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Ignore recorded state and run a full pass.
    pub force_full: bool,
    /// Report what would happen without touching disk or state.
    pub dry_run: bool,
}

/// What a run would do, computed without side effects.
#[derive(Debug, Clone)]
pub struct Plan {
    pub detection: Detection,
    /// Flattened input files.
    pub inputs: Vec<PathBuf>,
    /// Managed files a full pass deletes first. Empty for incremental plans.
    pub purge: Vec<PathBuf>,
    fingerprints: InputFingerprints,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Set when the run was a full pass.
    pub reason: Option<FullReason>,
    pub report: ReconcileReport,
    pub input_count: usize,
}

/// Detect what the next run for `config` would do.
pub fn plan(home: &Path, config: &ChecksumConfig, force_full: bool) -> Result<Plan, SyncError> {
    config.validate()?;
    let files = inputs::resolve(&config.files, &config.output_dir)?;
    let fingerprints = state::fingerprint_all(&files)?;

    let detection = if force_full {
        Detection::full(FullReason::Forced)
    } else {
        let previous = load_previous(home, &config.output_dir)?;
        changes::detect(previous.as_ref(), config, &fingerprints)
    };

    let purge = match detection.mode {
        RunMode::Full => reconcile::managed_files(&config.output_dir)?,
        RunMode::Incremental(_) => Vec::new(),
    };

    Ok(Plan {
        detection,
        inputs: files,
        purge,
        fingerprints,
    })
}

/// Run change detection and reconciliation for `config`.
pub fn run(
    home: &Path,
    config: &ChecksumConfig,
    options: RunOptions,
) -> Result<RunOutcome, SyncError> {
    let plan = plan(home, config, options.force_full)?;
    match &plan.detection.reason {
        Some(reason) => tracing::info!("full pass for {}: {reason}", config.output_dir.display()),
        None => tracing::info!("incremental pass for {}", config.output_dir.display()),
    }

    if !options.dry_run {
        state::invalidate_at(home, &config.output_dir)?;
    }

    let resolved = ChecksumConfig {
        files: plan.inputs.clone(),
        ..config.clone()
    };
    let report = reconcile(
        &resolved,
        &plan.detection.mode,
        ReconcileOptions {
            dry_run: options.dry_run,
        },
    )?;

    if !options.dry_run {
        state::save_at(home, &RunState::capture(config, plan.fingerprints))?;
    }

    Ok(RunOutcome {
        reason: plan.detection.reason,
        report,
        input_count: plan.inputs.len(),
    })
}

/// Unreadable state means "no trustworthy prior run", not a fatal error.
fn load_previous(home: &Path, output_dir: &Path) -> Result<Option<RunState>, SyncError> {
    match state::load_at(home, output_dir) {
        Ok(previous) => Ok(previous),
        Err(SyncError::Json(e)) => {
            tracing::warn!("ignoring corrupt run state for {}: {e}", output_dir.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
