//! YAML task configuration.
//!
//! # File layout
//!
//! ```text
//! checksum.yaml
//!   output_dir: build/checksums
//!   algorithm: sha256
//!   append_name: false
//!   files:
//!     - dist/
//! ```
//!
//! Relative paths inside the file are resolved against the directory that
//! contains it, so a config loads the same way regardless of the caller's
//! working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Algorithm, ChecksumConfig};

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "checksum.yaml";

/// Default output directory, relative to the config file.
pub const DEFAULT_OUTPUT_DIR: &str = "build/checksums";

/// On-disk shape of `checksum.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub append_name: bool,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            algorithm: Algorithm::default(),
            append_name: false,
            files: vec![],
        }
    }
}

impl ConfigFile {
    /// Resolve relative paths against `base` and produce the run configuration.
    pub fn resolve(self, base: &Path) -> ChecksumConfig {
        ChecksumConfig {
            output_dir: absolutize(base, &self.output_dir),
            algorithm: self.algorithm,
            append_name: self.append_name,
            files: self.files.iter().map(|p| absolutize(base, p)).collect(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parse the raw config document at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_file_at(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load `path` and resolve it into a validated [`ChecksumConfig`].
pub fn load_at(path: &Path) -> Result<ChecksumConfig, ConfigError> {
    let file = load_file_at(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let config = file.resolve(base);
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write `file` to `path`.
///
/// Write flow: serialize → `<name>.tmp` sibling → `rename`.
pub fn save_at(path: &Path, file: &ConfigFile) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_owned());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    let yaml = serde_yaml::to_string(file)?;
    std::fs::write(&tmp_path, yaml)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
