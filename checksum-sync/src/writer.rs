//! Atomic artifact writes and idempotent deletes.
//!
//! ## `atomic_write` protocol
//!
//! 1. Content is formatted by the caller.
//! 2. Write to `.<name>.tmp.<ext>` next to the target.
//! 3. Rename to the final path (atomic on POSIX).
//!
//! The temporary keeps a managed extension, so a leftover from an interrupted
//! run is collected by the next full pass like any other stale artifact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Artifact actions
// ---------------------------------------------------------------------------

/// Outcome of processing a single artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactAction {
    /// Artifact was created or overwritten.
    Written { path: PathBuf },
    /// Artifact of a removed input was deleted.
    Removed { path: PathBuf },
    /// Input was removed but its artifact did not exist.
    Absent { path: PathBuf },
    /// Managed file deleted by the cleanup that opens a full pass.
    Purged { path: PathBuf },
    /// Unchanged input or directory entry; nothing touched.
    Skipped { path: PathBuf },
    /// `--dry-run` mode: the artifact *would* have been written.
    WouldWrite { path: PathBuf },
    /// `--dry-run` mode: the artifact *would* have been removed.
    WouldRemove { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been purged.
    WouldPurge { path: PathBuf },
}

impl ArtifactAction {
    pub fn path(&self) -> &Path {
        match self {
            ArtifactAction::Written { path }
            | ArtifactAction::Removed { path }
            | ArtifactAction::Absent { path }
            | ArtifactAction::Purged { path }
            | ArtifactAction::Skipped { path }
            | ArtifactAction::WouldWrite { path }
            | ArtifactAction::WouldRemove { path }
            | ArtifactAction::WouldPurge { path } => path,
        }
    }

    /// True for every action that changed (or would change) the disk.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            ArtifactAction::Absent { .. } | ArtifactAction::Skipped { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically write `content` to the artifact at `path`.
pub(crate) fn atomic_write(
    path: &Path,
    content: &[u8],
    dry_run: bool,
) -> Result<ArtifactAction, SyncError> {
    let tmp = tmp_path_for(path);
    atomic_write_with_tmp(path, content, dry_run, &tmp)
}

/// `.<file name>.tmp.<ext>` in the same directory as `path`.
pub(crate) fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp.{ext}"))
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &[u8],
    dry_run: bool,
    tmp: &Path,
) -> Result<ArtifactAction, SyncError> {
    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(ArtifactAction::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(ArtifactAction::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Deletes
// ---------------------------------------------------------------------------

/// Delete the artifact of a removed input. A missing artifact is not an error.
pub(crate) fn remove_artifact(path: &Path, dry_run: bool) -> Result<ArtifactAction, SyncError> {
    let path_buf = path.to_path_buf();
    if dry_run {
        return Ok(if path.is_file() {
            tracing::info!("[dry-run] would remove: {}", path.display());
            ArtifactAction::WouldRemove { path: path_buf }
        } else {
            ArtifactAction::Absent { path: path_buf }
        });
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("removed: {}", path.display());
            Ok(ArtifactAction::Removed { path: path_buf })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("already absent: {}", path.display());
            Ok(ArtifactAction::Absent { path: path_buf })
        }
        Err(e) => Err(io_err(path, e)),
    }
}

/// Delete a managed file during full-pass cleanup.
pub(crate) fn purge_file(path: &Path, dry_run: bool) -> Result<ArtifactAction, SyncError> {
    let path_buf = path.to_path_buf();
    if dry_run {
        tracing::info!("[dry-run] would purge: {}", path.display());
        return Ok(ArtifactAction::WouldPurge { path: path_buf });
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("purged: {}", path.display());
            Ok(ArtifactAction::Purged { path: path_buf })
        }
        // Already gone.
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ArtifactAction::Absent { path: path_buf }),
        Err(e) => Err(io_err(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("foo.txt.sha256");
        let result = atomic_write(&path, b"abc", false).unwrap();
        assert!(matches!(result, ArtifactAction::Written { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn write_overwrites_existing_artifact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("foo.txt.md5");
        atomic_write(&path, b"v1", false).unwrap();
        atomic_write(&path, b"v2", false).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"v2");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.txt.sha256");
        let result = atomic_write(&path, b"content", true).unwrap();
        assert!(matches!(result, ArtifactAction::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_name_keeps_managed_extension() {
        let tmp = tmp_path_for(Path::new("/out/foo.txt.sha384"));
        assert_eq!(tmp, PathBuf::from("/out/.foo.txt.sha384.tmp.sha384"));
        assert!(crate::artifact::is_managed(&tmp));
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.txt.sha512");
        atomic_write(&path, b"data", false).unwrap();
        assert!(!tmp_path_for(&path).exists(), "tmp must be cleaned up");
    }

    #[test]
    fn remove_missing_artifact_is_absent_not_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.txt.sha256");
        let result = remove_artifact(&path, false).unwrap();
        assert!(matches!(result, ArtifactAction::Absent { .. }));
        assert!(!result.is_mutation());
    }

    #[test]
    fn remove_existing_artifact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bar.txt.sha256");
        fs::write(&path, "x").unwrap();
        let result = remove_artifact(&path, false).unwrap();
        assert!(matches!(result, ArtifactAction::Removed { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn dry_run_remove_keeps_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bar.txt.sha256");
        fs::write(&path, "x").unwrap();
        let result = remove_artifact(&path, true).unwrap();
        assert!(matches!(result, ArtifactAction::WouldRemove { .. }));
        assert!(path.exists());
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("file.txt.sha256");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join(".file.txt.sha256.tmp.sha256");

        let result = atomic_write_with_tmp(&path, b"new content", false, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root bypasses directory permissions; only assert when the rename failed.
        if result.is_err() {
            let current = fs::read_to_string(&path).unwrap();
            assert_eq!(current, "original", "original file should be intact");
            assert!(!tmp_path.exists(), "tmp should be cleaned up");
        }
    }
}
