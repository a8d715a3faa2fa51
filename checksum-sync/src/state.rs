//! Run state — what the last successful run saw, for change detection.
//!
//! Persists a `RunState` JSON document at
//! `<home>/.checksum/state/<key>.json`, one per output directory.
//! Writes use an atomic `.tmp` + rename.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use checksum_core::{Algorithm, ChecksumConfig};

use crate::error::{io_err, SyncError};
use crate::hasher;

/// Identity of an input file's content: length plus SHA-256 of its bytes.
///
/// Timestamps are not part of the identity: a same-length rewrite that keeps
/// the old mtime (`cp -p`, `tar -x`) still counts as modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub len: u64,
    #[serde(default)]
    pub sha256: String,
}

impl FileFingerprint {
    /// Fingerprint the file at `path` by hashing its content.
    pub fn of(path: &Path) -> Result<Self, SyncError> {
        let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        let sha256 = hasher::digest_file(path, Algorithm::Sha256)?;
        Ok(Self {
            len: meta.len(),
            sha256,
        })
    }
}

/// In-memory input map: absolute input path string → fingerprint.
pub type InputFingerprints = BTreeMap<String, FileFingerprint>;

/// On-disk run state payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunState {
    pub recorded_at: DateTime<Utc>,
    pub algorithm: Algorithm,
    pub append_name: bool,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub inputs: InputFingerprints,
}

impl RunState {
    /// Snapshot `config` together with the fingerprints of its current inputs.
    pub fn capture(config: &ChecksumConfig, inputs: InputFingerprints) -> Self {
        Self {
            recorded_at: Utc::now(),
            algorithm: config.algorithm,
            append_name: config.append_name,
            output_dir: config.output_dir.clone(),
            inputs,
        }
    }
}

/// Fingerprint every file in `files`.
pub fn fingerprint_all(files: &[PathBuf]) -> Result<InputFingerprints, SyncError> {
    let mut map = InputFingerprints::new();
    for file in files {
        map.insert(file.to_string_lossy().into_owned(), FileFingerprint::of(file)?);
    }
    Ok(map)
}

/// Path to the state JSON for `output_dir`, rooted at `home`.
///
/// `~/.checksum/state/<first 16 hex of sha256(output_dir)>.json`
pub fn state_path_at(home: &Path, output_dir: &Path) -> PathBuf {
    let digest = hex::encode(Sha256::digest(output_dir.to_string_lossy().as_bytes()));
    home.join(".checksum")
        .join("state")
        .join(format!("{}.json", &digest[..16]))
}

/// Load the run state for `output_dir`.
///
/// Returns `None` if no successful run has been recorded.
pub fn load_at(home: &Path, output_dir: &Path) -> Result<Option<RunState>, SyncError> {
    let path = state_path_at(home, output_dir);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(&path, e)),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save the run state atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(home: &Path, state: &RunState) -> Result<(), SyncError> {
    let path = state_path_at(home, &state.output_dir);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid run state path")));
    };

    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Forget the recorded state so the next run is a full pass.
pub fn invalidate_at(home: &Path, output_dir: &Path) -> Result<(), SyncError> {
    let path = state_path_at(home, output_dir);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(&path, e)),
    }
}
