//! `checksum generate` — bring checksum files in line with the inputs.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use checksum_core::RunModeKind;
use checksum_sync::{
    pipeline::{self, RunOptions},
    ArtifactAction, RunOutcome,
};

use super::{home_dir, TaskArgs};

/// Arguments for `checksum generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub task: TaskArgs,

    /// Ignore recorded state: purge every checksum file and regenerate.
    #[arg(long)]
    pub full: bool,

    /// Show what would be written without touching any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = self.task.resolve()?;
        let options = RunOptions {
            force_full: self.full,
            dry_run: self.dry_run,
        };

        let outcome = pipeline::run(&home, &config, options).with_context(|| {
            format!(
                "checksum generation failed for '{}'",
                config.output_dir.display()
            )
        })?;
        print_outcome(&outcome, self.dry_run);
        Ok(())
    }
}

fn print_outcome(outcome: &RunOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let report = &outcome.report;
    let mode = match report.mode {
        RunModeKind::Full => "full".yellow().bold(),
        RunModeKind::Incremental => "incremental".green().bold(),
    };

    if report.mutations() == 0 {
        println!(
            "{prefix}✓ {} pass over {} input(s) — nothing to do",
            mode, outcome.input_count
        );
        return;
    }

    println!(
        "{prefix}✓ {} pass over {} input(s) ({} written, {} removed, {} purged, {} unchanged)",
        mode,
        outcome.input_count,
        report.written(),
        report.removed(),
        report.purged(),
        report.skipped()
    );
    if let Some(reason) = &outcome.reason {
        println!("  reason: {reason}");
    }

    for action in &report.actions {
        let symbol = match action {
            ArtifactAction::Written { .. } => "✎",
            ArtifactAction::Removed { .. } => "✗",
            ArtifactAction::Purged { .. } => "♻",
            ArtifactAction::WouldWrite { .. }
            | ArtifactAction::WouldRemove { .. }
            | ArtifactAction::WouldPurge { .. } => "~",
            ArtifactAction::Skipped { .. } => "·",
            ArtifactAction::Absent { .. } => continue,
        };
        println!("  {symbol}  {}", action.path().display());
    }
}
