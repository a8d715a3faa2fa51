//! `checksum status` — preview the next run without touching anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use checksum_core::{ChangeKind, ChecksumConfig, RunMode};
use checksum_sync::{artifact, pipeline};

use super::{home_dir, TaskArgs};

/// Arguments for `checksum status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub task: TaskArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = self.task.resolve()?;
        let plan = pipeline::plan(&home, &config, false).with_context(|| {
            format!("status check failed for '{}'", config.output_dir.display())
        })?;

        let report = build_report(&config, &plan);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    output_dir: PathBuf,
    algorithm: String,
    mode: String,
    reason: Option<String>,
    inputs: usize,
    pending: Vec<PendingChange>,
}

#[derive(Debug, Serialize, Tabled)]
struct PendingChange {
    #[tabled(rename = "input")]
    input: String,
    #[tabled(rename = "change")]
    change: String,
    #[tabled(rename = "artifact")]
    artifact: String,
}

fn build_report(config: &ChecksumConfig, plan: &pipeline::Plan) -> StatusReport {
    let entries: Vec<(PathBuf, ChangeKind)> = match &plan.detection.mode {
        RunMode::Full => plan
            .inputs
            .iter()
            .map(|p| (p.clone(), ChangeKind::Added))
            .collect(),
        RunMode::Incremental(changes) => changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Unchanged)
            .map(|c| (c.path.clone(), c.kind))
            .collect(),
    };

    let purges = plan.purge.iter().map(|path| PendingChange {
        input: "-".to_string(),
        change: "purge".to_string(),
        artifact: path.display().to_string(),
    });
    let updates = entries.into_iter().map(|(input, kind)| PendingChange {
        artifact: artifact::artifact_path(&config.output_dir, &input, config.algorithm)
            .display()
            .to_string(),
        input: input.display().to_string(),
        change: kind.to_string(),
    });
    let pending = purges.chain(updates).collect();

    StatusReport {
        output_dir: config.output_dir.clone(),
        algorithm: config.algorithm.to_string(),
        mode: plan.detection.mode.kind().to_string(),
        reason: plan.detection.reason.as_ref().map(|r| r.to_string()),
        inputs: plan.inputs.len(),
        pending,
    }
}

fn print_table(report: StatusReport) {
    let mode = if report.reason.is_some() {
        report.mode.to_uppercase().yellow().bold()
    } else {
        report.mode.to_uppercase().green().bold()
    };
    println!(
        "{} | {} | {} input(s) → {}",
        mode,
        report.algorithm,
        report.inputs,
        report.output_dir.display()
    );
    if let Some(reason) = &report.reason {
        println!("  reason: {reason}");
    }

    if report.pending.is_empty() {
        println!("Up to date.");
        return;
    }

    let mut table = Table::new(report.pending);
    table.with(Style::rounded());
    println!("{table}");
    println!("Run 'checksum generate' to apply.");
}
