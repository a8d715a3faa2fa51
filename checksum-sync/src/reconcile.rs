//! Reconciliation of checksum artifacts against the current inputs.
//!
//! A run is driven by a [`RunMode`]:
//!
//! 1. Ensure the output directory exists (fatal if it cannot be created).
//! 2. `Full` only: delete every managed file (`*.md5`, `*.sha256`,
//!    `*.sha384`, `*.sha512`) directly inside the output directory, for all
//!    four algorithms.
//! 3. Per entry: ADDED / MODIFIED → hash and write, REMOVED → delete if
//!    present, UNCHANGED → leave alone. `Full` treats every configured file
//!    as ADDED.
//!
//! The first failure aborts the traversal. Artifacts already written in the
//! run stay on disk; there is no rollback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use checksum_core::{ChangeKind, ChecksumConfig, RunMode, RunModeKind};

use crate::artifact;
use crate::error::{io_err, SyncError};
use crate::hasher;
use crate::writer::{self, ArtifactAction};

/// Per-invocation switches that do not affect artifact content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Classify and report without touching the filesystem.
    pub dry_run: bool,
}

/// Everything a reconciliation pass did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub mode: RunModeKind,
    pub actions: Vec<ArtifactAction>,
}

impl ReconcileReport {
    pub fn written(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                ArtifactAction::Written { .. } | ArtifactAction::WouldWrite { .. }
            )
        })
    }

    pub fn removed(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                ArtifactAction::Removed { .. } | ArtifactAction::WouldRemove { .. }
            )
        })
    }

    pub fn purged(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                ArtifactAction::Purged { .. } | ArtifactAction::WouldPurge { .. }
            )
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, ArtifactAction::Skipped { .. }))
    }

    /// Number of actions that changed (or in dry-run would change) the disk.
    pub fn mutations(&self) -> usize {
        self.count(ArtifactAction::is_mutation)
    }

    fn count(&self, pred: impl Fn(&ArtifactAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

/// Bring the artifacts in `config.output_dir` in line with `mode`.
///
/// `config.files` is the flattened input list; directory entries in it are
/// skipped.
pub fn reconcile(
    config: &ChecksumConfig,
    mode: &RunMode,
    options: ReconcileOptions,
) -> Result<ReconcileReport, SyncError> {
    let dry_run = options.dry_run;
    let output_dir = config.output_dir.as_path();
    ensure_output_dir(output_dir, dry_run)?;

    let mut actions = Vec::new();
    let entries: Vec<(&Path, ChangeKind)> = match mode {
        RunMode::Full => {
            tracing::debug!("full pass: purging managed files in {}", output_dir.display());
            purge_managed(output_dir, dry_run, &mut actions)?;
            config
                .files
                .iter()
                .map(|p| (p.as_path(), ChangeKind::Added))
                .collect()
        }
        RunMode::Incremental(changes) => changes
            .iter()
            .map(|c| (c.path.as_path(), c.kind))
            .collect(),
    };

    let mut written_by: HashMap<PathBuf, PathBuf> = HashMap::new();
    for (input, kind) in entries {
        if input.is_dir() {
            tracing::debug!("skipping directory input: {}", input.display());
            continue;
        }
        if matches!(kind, ChangeKind::Added | ChangeKind::Modified) {
            warn_on_collision(config, input, &mut written_by);
        }
        actions.push(process_entry(config, input, kind, dry_run)?);
    }

    Ok(ReconcileReport {
        mode: mode.kind(),
        actions,
    })
}

/// Apply one change classification to its artifact.
fn process_entry(
    config: &ChecksumConfig,
    input: &Path,
    kind: ChangeKind,
    dry_run: bool,
) -> Result<ArtifactAction, SyncError> {
    let target = artifact::artifact_path(&config.output_dir, input, config.algorithm);
    match kind {
        ChangeKind::Added | ChangeKind::Modified => {
            if dry_run {
                return writer::atomic_write(&target, &[], true);
            }
            let digest = hasher::digest_file(input, config.algorithm)?;
            tracing::debug!("{kind}: {} = {digest}", input.display());
            let content = artifact::artifact_content(&digest, input, config.append_name);
            writer::atomic_write(&target, &content, false)
        }
        ChangeKind::Removed => writer::remove_artifact(&target, dry_run),
        ChangeKind::Unchanged => {
            tracing::debug!("unchanged: {}", input.display());
            Ok(ArtifactAction::Skipped { path: target })
        }
    }
}

fn ensure_output_dir(dir: &Path, dry_run: bool) -> Result<(), SyncError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(SyncError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
        return Ok(());
    }
    if dry_run {
        tracing::info!("[dry-run] would create: {}", dir.display());
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
}

/// Delete managed files directly inside `dir`.
fn purge_managed(
    dir: &Path,
    dry_run: bool,
    actions: &mut Vec<ArtifactAction>,
) -> Result<(), SyncError> {
    for path in managed_files(dir)? {
        actions.push(writer::purge_file(&path, dry_run)?);
    }
    Ok(())
}

/// Managed files directly inside `dir`, sorted: what a full pass purges.
///
/// Subdirectories and foreign files are never listed. A missing `dir` has
/// none.
pub fn managed_files(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    let mut managed = Vec::new();
    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() || !artifact::is_managed(&path) {
            continue;
        }
        managed.push(path);
    }
    Ok(managed)
}

fn warn_on_collision(
    config: &ChecksumConfig,
    input: &Path,
    written_by: &mut HashMap<PathBuf, PathBuf>,
) {
    let target = artifact::artifact_path(&config.output_dir, input, config.algorithm);
    if let Some(previous) = written_by.insert(target.clone(), input.to_path_buf()) {
        if previous != input {
            tracing::warn!(
                "{} and {} share artifact {}; the later write wins",
                previous.display(),
                input.display(),
                target.display()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
