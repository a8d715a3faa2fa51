//! Flatten configured input paths into the set of files to checksum.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Expand `paths` into a sorted, deduplicated list of regular files.
///
/// Directories are walked recursively without following symlinked
/// directories. Paths that do not exist are dropped: they are simply not
/// current inputs. Nothing at or below `output_dir` is ever an input, so a
/// walked tree that contains the output directory does not pick up its own
/// artifacts.
pub fn resolve(paths: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = BTreeSet::new();
    for path in paths {
        if path.starts_with(output_dir) {
            tracing::warn!(
                "input lies inside the output directory, skipping: {}",
                path.display()
            );
            continue;
        }
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("input does not exist, skipping: {}", path.display());
                continue;
            }
            Err(e) => return Err(io_err(path, e)),
        };
        if meta.is_dir() {
            walk(path, output_dir, &mut files)?;
        } else {
            files.insert(path.clone());
        }
    }
    Ok(files.into_iter().collect())
}

fn walk(dir: &Path, output_dir: &Path, files: &mut BTreeSet<PathBuf>) -> Result<(), SyncError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.starts_with(output_dir) {
            tracing::debug!("not walking output directory: {}", path.display());
            continue;
        }
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            walk(&path, output_dir, files)?;
        } else if file_type.is_symlink() {
            // Follow links to files, never links to directories.
            if path.is_file() {
                files.insert(path);
            }
        } else {
            files.insert(path);
        }
    }
    Ok(())
}
