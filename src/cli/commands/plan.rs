//! Implementation of the `relay plan` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::load_tasks;
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::Config;
use crate::services::execution_plan::ExecutionStep;
use crate::services::OrchestrationSession;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// YAML or JSON file with task definitions
    pub tasks: PathBuf,

    /// Run every task in its own step
    #[arg(long)]
    pub sequential: bool,

    /// Maximum tasks per parallel step (0 = unlimited)
    #[arg(long)]
    pub max_parallel: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStepOutput {
    pub step: usize,
    pub parallel: bool,
    pub tasks: Vec<PlanTaskOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTaskOutput {
    pub id: String,
    pub title: String,
    pub worker: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub session_id: String,
    pub total_tasks: usize,
    pub total_steps: usize,
    pub parallel_steps: usize,
    pub steps: Vec<PlanStepOutput>,
}

impl CommandOutput for PlanOutput {
    fn to_human(&self) -> String {
        if self.steps.is_empty() {
            return "No tasks to plan.".to_string();
        }

        let mut table = list_table(&["step", "mode", "tasks", "workers", "note"]);
        for step in &self.steps {
            let ids: Vec<String> = step
                .tasks
                .iter()
                .map(|t| format!("{} {}", t.id, truncate(&t.title, 30)))
                .collect();
            let workers: Vec<&str> = step
                .tasks
                .iter()
                .map(|t| if t.worker.is_empty() { "-" } else { t.worker.as_str() })
                .collect();
            table.add_row(vec![
                step.step.to_string(),
                if step.parallel { "parallel" } else { "sequential" }.to_string(),
                ids.join("\n"),
                workers.join("\n"),
                step.sequential_reason.clone().unwrap_or_default(),
            ]);
        }

        format!(
            "Plan for {} task(s) in {} step(s), {} parallel:\n{}",
            self.total_tasks, self.total_steps, self.parallel_steps, table
        )
    }
}

fn step_output(step: &ExecutionStep, session: &OrchestrationSession) -> PlanStepOutput {
    PlanStepOutput {
        step: step.step,
        parallel: step.parallel,
        tasks: step
            .task_ids
            .iter()
            .filter_map(|id| session.task(id))
            .map(|t| PlanTaskOutput {
                id: t.id.clone(),
                title: t.title.clone(),
                worker: t.assigned_worker.clone(),
            })
            .collect(),
        sequential_reason: step.sequential_reason.clone(),
    }
}

pub async fn execute(args: PlanArgs, config: &Config, json_mode: bool) -> Result<()> {
    let tasks = load_tasks(&args.tasks).await?;

    let mut config = config.clone();
    if args.sequential {
        config.planner.allow_parallel = false;
    }
    if let Some(max) = args.max_parallel {
        config.planner.max_parallel_tasks = max;
    }

    let session = OrchestrationSession::create_with_config(tasks, &config)
        .with_context(|| format!("Cannot plan {}", args.tasks.display()))?;

    let plan = session.plan();
    plan.validate(session.tasks())
        .context("Planner produced an unsound plan")?;

    let result = PlanOutput {
        session_id: session.id.clone(),
        total_tasks: plan.total_tasks(),
        total_steps: plan.total_steps(),
        parallel_steps: plan.parallel_step_count(),
        steps: plan.steps.iter().map(|s| step_output(s, &session)).collect(),
    };

    output(&result, json_mode);
    Ok(())
}
