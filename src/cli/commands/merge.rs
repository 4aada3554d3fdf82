//! Implementation of the `relay merge` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::{load_report, load_tasks};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{AgentDisagreement, Config, MergeDecision, TaskStatus};
use crate::services::handoff_aggregator::{merge_handoff_data, MergedHandoff};
use crate::services::MergeEvaluator;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Completion reports: worker responses with a fenced block, or bare report files
    #[arg(required = true)]
    pub reports: Vec<PathBuf>,

    /// Task file used to check for failed tasks
    #[arg(short, long)]
    pub tasks: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutput {
    pub report_count: usize,
    pub decision: MergeDecision,
    pub merged: MergedHandoff,
    pub disagreements: Vec<AgentDisagreement>,
}

impl CommandOutput for MergeOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} {} ({} report(s))",
            if self.decision.can_auto_merge { "✓" } else { "✗" },
            self.decision.reason,
            self.report_count
        )];

        if !self.decision.conflicts.is_empty() {
            lines.push(format!("Conflicting files: {}", self.decision.conflicts.join(", ")));
        }
        for rec in &self.decision.recommendations {
            lines.push(format!("  - {rec}"));
        }

        lines.push(format!(
            "\nFiles modified: {}  Files created: {}  Decisions: {}  Warnings: {}",
            self.merged.files_modified.len(),
            self.merged.files_created.len(),
            self.merged.decisions.len(),
            self.merged.warnings.len()
        ));

        if !self.merged.summary.is_empty() {
            lines.push(format!("\n{}", self.merged.summary));
        }

        for d in &self.disagreements {
            lines.push(format!(
                "\n! {} ({} priority): {}",
                d.topic,
                d.priority,
                d.agents.join(" vs ")
            ));
        }

        lines.join("\n")
    }
}

pub async fn execute(args: MergeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut handoffs = Vec::with_capacity(args.reports.len());
    for path in &args.reports {
        handoffs.push(load_report(path).await?);
    }

    let mut tasks = match &args.tasks {
        Some(path) => load_tasks(path).await?,
        None => Vec::new(),
    };

    // A report that did not succeed marks its task failed
    for handoff in handoffs.iter().filter(|h| !h.status.is_success()) {
        if let Some(task) = tasks.iter_mut().find(|t| t.id == handoff.task_id) {
            task.status = TaskStatus::Failed;
        }
    }

    let evaluator = MergeEvaluator::new(config.evaluator.clone());
    let result = MergeOutput {
        report_count: handoffs.len(),
        decision: evaluator.evaluate_auto_merge(&tasks, &handoffs),
        merged: merge_handoff_data(&handoffs),
        disagreements: evaluator.detect_disagreements(&handoffs),
    };

    output(&result, json_mode);
    Ok(())
}
