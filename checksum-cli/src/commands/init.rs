//! `checksum init [--path checksum.yaml] [--force]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use checksum_core::{
    config::{self, ConfigFile, DEFAULT_CONFIG_FILE},
    Algorithm,
};

/// Write a starter task configuration.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the config file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,

    /// Algorithm recorded in the new config.
    #[arg(long, short = 'a', value_name = "ALG", default_value_t = Algorithm::default())]
    pub algorithm: Algorithm,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "'{}' already exists; pass --force to overwrite",
                self.path.display()
            );
        }

        let file = ConfigFile {
            algorithm: self.algorithm,
            ..ConfigFile::default()
        };
        config::save_at(&self.path, &file)
            .with_context(|| format!("failed to write '{}'", self.path.display()))?;

        println!("✓ Wrote {}", self.path.display());
        println!("  Add input paths under `files:` and run `checksum generate`.");
        Ok(())
    }
}
