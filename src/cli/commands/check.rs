//! Implementation of the `relay check` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::load_tasks;
use crate::cli::output::{list_table, output, CommandOutput};
use crate::services::{ConflictDetector, DependencyResolver};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML or JSON file with task definitions
    pub tasks: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub valid: bool,
    pub task_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cycles: Vec<Vec<String>>,
    /// Tasks whose dependencies are all completed
    pub ready: Vec<String>,
    /// Longest dependency chain below each task (only for valid sets)
    pub depths: BTreeMap<String, usize>,
    /// Files claimed by more than one task
    pub file_overlaps: BTreeMap<String, Vec<String>>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        match &self.error {
            None => lines.push(format!("✓ {} task(s), no structural problems", self.task_count)),
            Some(err) => lines.push(format!("✗ {err}")),
        }

        for cycle in &self.cycles {
            lines.push(format!("  cycle: {}", cycle.join(" -> ")));
        }

        if !self.ready.is_empty() {
            lines.push(format!("\nReady now: {}", self.ready.join(", ")));
        }

        if !self.depths.is_empty() {
            let mut table = list_table(&["task", "depth"]);
            for (id, depth) in &self.depths {
                table.add_row(vec![id.clone(), depth.to_string()]);
            }
            lines.push(format!("\n{table}"));
        }

        if !self.file_overlaps.is_empty() {
            lines.push("\nFile overlaps (these tasks never share a parallel step):".to_string());
            let mut table = list_table(&["file", "tasks"]);
            for (file, ids) in &self.file_overlaps {
                table.add_row(vec![file.clone(), ids.join(", ")]);
            }
            lines.push(table.to_string());
        }

        lines.join("\n")
    }
}

pub async fn execute(args: CheckArgs, json_mode: bool) -> Result<()> {
    let tasks = load_tasks(&args.tasks).await?;
    let resolver = DependencyResolver::new();
    let detector = ConflictDetector::new();

    let validation = resolver.validate(&tasks);
    let depths = if validation.is_ok() {
        tasks
            .iter()
            .map(|t| Ok((t.id.clone(), resolver.calculate_depth(&t.id, &tasks)?)))
            .collect::<crate::domain::DomainResult<BTreeMap<_, _>>>()?
    } else {
        BTreeMap::new()
    };

    let result = CheckOutput {
        valid: validation.is_ok(),
        task_count: tasks.len(),
        error: validation.err().map(|e| e.to_string()),
        cycles: resolver.detect_cycles(&tasks),
        ready: resolver
            .ready_tasks(&tasks)
            .into_iter()
            .map(|t| t.id.clone())
            .collect(),
        depths,
        file_overlaps: detector.detect_file_overlaps(&tasks),
    };

    output(&result, json_mode);
    Ok(())
}
