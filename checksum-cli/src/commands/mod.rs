pub mod generate;
pub mod init;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use checksum_core::{
    config::{self, ConfigFile, DEFAULT_CONFIG_FILE},
    Algorithm, ChecksumConfig,
};

/// Task selection shared by `generate` and `status`.
#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Input files or directories. Replaces the config file's `files` list.
    pub files: Vec<PathBuf>,

    /// Path to the task configuration.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory receiving the checksum files.
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// md5 | sha256 | sha384 | sha512.
    #[arg(long, short = 'a', value_name = "ALG")]
    pub algorithm: Option<Algorithm>,

    /// Write "<digest>  <name>" lines readable by `sha256sum -c`.
    #[arg(long)]
    pub append_name: bool,
}

impl TaskArgs {
    /// Merge the config file (if any) with command-line overrides.
    ///
    /// An explicit `--config` must exist; the default `checksum.yaml` is
    /// optional.
    pub fn resolve(&self) -> Result<ChecksumConfig> {
        let cwd = std::env::current_dir().context("could not determine working directory")?;

        let mut resolved = match &self.config {
            Some(path) => load(&absolutize(&cwd, path))?,
            None => {
                let path = cwd.join(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    load(&path)?
                } else {
                    ConfigFile::default().resolve(&cwd)
                }
            }
        };

        if !self.files.is_empty() {
            resolved.files = self.files.iter().map(|p| absolutize(&cwd, p)).collect();
        }
        if let Some(dir) = &self.output_dir {
            resolved.output_dir = absolutize(&cwd, dir);
        }
        if let Some(algorithm) = self.algorithm {
            resolved.algorithm = algorithm;
        }
        if self.append_name {
            resolved.append_name = true;
        }

        if resolved.files.is_empty() {
            tracing::warn!("no input files configured");
        }
        Ok(resolved)
    }
}

fn load(path: &Path) -> Result<ChecksumConfig> {
    config::load_at(path).with_context(|| format!("failed to load config '{}'", path.display()))
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
