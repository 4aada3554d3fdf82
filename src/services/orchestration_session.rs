//! Orchestration session: the stateful holder of a task set, its plan,
//! and a cursor into the plan.
//!
//! The session never runs anything. A caller pulls the current step with
//! [`OrchestrationSession::next_tasks`], runs those tasks elsewhere, feeds
//! results back through [`OrchestrationSession::record_task_completion`],
//! and then calls [`OrchestrationSession::advance`].
//!
//! ```text
//! active ──advance (plan exhausted)──▶ completed
//!   │  ▲
//!   │  └──resume── paused
//!   ├──pause─────▶ paused
//!   └──advance (a task failed)──▶ failed
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dependency_resolver::DependencyResolver;
use super::execution_plan::ExecutionPlan;
use super::execution_planner::ExecutionPlanner;
use super::handoff_aggregator::merge_handoff_data;
use super::merge_evaluator::MergeEvaluator;
use crate::domain::models::{
    AgentDisagreement, Config, EvaluatorConfig, HandoffData, MergeDecision, SessionProgress,
    SessionStatus, Task, TaskOutcome, TaskStatus,
};
use crate::domain::{DomainError, DomainResult};

/// A planning and bookkeeping session over one task set.
///
/// The session is the single owner of its tasks for its whole lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationSession {
    pub id: String,

    /// Tasks in topological order
    tasks: Vec<Task>,

    plan: ExecutionPlan,

    current_step: usize,

    handoff_history: Vec<HandoffData>,

    status: SessionStatus,

    /// Digest written when the session completes
    summary: Option<String>,

    /// Merge verdict computed when the session completes
    merge_decision: Option<MergeDecision>,

    /// Evaluator settings the session was created with
    #[serde(default)]
    evaluator_config: EvaluatorConfig,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrchestrationSession {
    /// Create a session with default planner and evaluator settings.
    pub fn create(tasks: Vec<Task>) -> DomainResult<Self> {
        Self::create_with_config(tasks, &Config::default())
    }

    /// Validate, sort and plan the tasks, then open an active session.
    ///
    /// Structural problems (duplicate ids, self or unknown dependencies,
    /// cycles, a stalled planner) are returned as errors; no session is
    /// created from a task set that cannot be fully planned.
    #[instrument(skip(tasks, config), fields(task_count = tasks.len()))]
    pub fn create_with_config(tasks: Vec<Task>, config: &Config) -> DomainResult<Self> {
        let resolver = DependencyResolver::new();
        resolver.validate(&tasks)?;

        let sorted = resolver.topological_sort(&tasks)?;
        let plan = ExecutionPlanner::new(config.planner.clone()).plan(&sorted)?;

        let now = Utc::now();
        let session = Self {
            id: Uuid::new_v4().to_string(),
            tasks: sorted,
            plan,
            current_step: 0,
            handoff_history: Vec::new(),
            status: SessionStatus::Active,
            summary: None,
            merge_decision: None,
            evaluator_config: config.evaluator.clone(),
            created_at: now,
            updated_at: now,
        };

        info!(
            session_id = %session.id,
            steps = session.plan.total_steps(),
            parallel_steps = session.plan.parallel_step_count(),
            "orchestration session created"
        );

        Ok(session)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub const fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub const fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn handoff_history(&self) -> &[HandoffData] {
        &self.handoff_history
    }

    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub const fn merge_decision(&self) -> Option<&MergeDecision> {
        self.merge_decision.as_ref()
    }

    /// Tasks of the current step, or `None` once the plan is exhausted.
    ///
    /// Also `None` while the session is paused or has failed.
    pub fn next_tasks(&self) -> Option<Vec<&Task>> {
        if self.status != SessionStatus::Active {
            return None;
        }

        let step = self.plan.get_step(self.current_step)?;
        Some(
            step.task_ids
                .iter()
                .filter_map(|id| self.task(id))
                .collect(),
        )
    }

    /// Mark a task of the current step as dispatched.
    pub fn start_task(&mut self, task_id: &str) -> DomainResult<()> {
        self.ensure_not_terminal("in-progress")?;

        let in_current_step = self
            .plan
            .get_step(self.current_step)
            .is_some_and(|step| step.contains(task_id));
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| DomainError::TaskNotFound(task_id.to_string()))?;

        if !in_current_step || !task.status.is_startable() {
            return Err(DomainError::InvalidStateTransition {
                from: task.status.to_string(),
                to: TaskStatus::InProgress.to_string(),
                reason: format!("task {task_id} is not startable in step {}", self.current_step),
            });
        }

        task.status = TaskStatus::InProgress;
        task.started_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record the result of a task.
    ///
    /// Returns whether the result was applied. Unknown task ids, tasks that
    /// already finished, and results arriving after the session ended are
    /// logged and ignored.
    #[instrument(skip(self, outcome), fields(session_id = %self.id, task_id = %outcome.task_id()))]
    pub fn record_task_completion(&mut self, outcome: TaskOutcome) -> bool {
        if self.status.is_terminal() {
            warn!(status = %self.status, "ignoring task result for a finished session");
            return false;
        }

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == outcome.task_id()) else {
            warn!("ignoring result for unknown task");
            return false;
        };

        if task.status.is_terminal() {
            warn!(status = %task.status, "ignoring duplicate result for finished task");
            return false;
        }

        let now = Utc::now();
        match outcome {
            TaskOutcome::Succeeded { handoff, .. } => {
                task.status = TaskStatus::Completed;
                task.completed_at = Some(now);
                task.error = None;
                if let Some(handoff) = handoff {
                    task.completion_report = Some(handoff.clone());
                    self.handoff_history.push(handoff);
                }
            }
            TaskOutcome::Failed { error, handoff, .. } => {
                warn!(error = %error, "task failed");
                task.status = TaskStatus::Failed;
                task.error = Some(error);
                if let Some(handoff) = handoff {
                    task.completion_report = Some(handoff.clone());
                    self.handoff_history.push(handoff);
                }
            }
        }

        self.updated_at = now;
        true
    }

    /// Try to move past the current step.
    ///
    /// Returns `true` only when the cursor moved and more steps remain.
    /// A failed task in the current step fails the session; finishing the
    /// last step completes it and stores the summary and merge verdict.
    #[instrument(skip(self), fields(session_id = %self.id, step = self.current_step))]
    pub fn advance(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }

        let Some(step) = self.plan.get_step(self.current_step) else {
            self.complete();
            return false;
        };

        let statuses: Vec<TaskStatus> = step
            .task_ids
            .iter()
            .filter_map(|id| self.task(id).map(|t| t.status))
            .collect();

        if statuses.contains(&TaskStatus::Failed) {
            self.status = SessionStatus::Failed;
            self.updated_at = Utc::now();
            warn!("session failed: a task in the current step failed");
            return false;
        }

        if !statuses.iter().all(|s| *s == TaskStatus::Completed) {
            return false;
        }

        self.current_step += 1;
        self.updated_at = Utc::now();

        if self.current_step >= self.plan.total_steps() {
            self.complete();
            return false;
        }

        info!(next_step = self.current_step, "advanced to next step");
        true
    }

    /// Hold the session. Only an active session can be paused.
    pub fn pause(&mut self) -> DomainResult<()> {
        self.transition(SessionStatus::Active, SessionStatus::Paused)
    }

    /// Resume a paused session.
    pub fn resume(&mut self) -> DomainResult<()> {
        self.transition(SessionStatus::Paused, SessionStatus::Active)
    }

    /// Snapshot of progress through the plan.
    pub fn progress(&self) -> SessionProgress {
        let mut progress = SessionProgress {
            status: self.status,
            current_step: self.current_step,
            total_steps: self.plan.total_steps(),
            total_tasks: self.tasks.len(),
            ..SessionProgress::default()
        };

        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending | TaskStatus::Ready => progress.pending += 1,
                TaskStatus::InProgress => progress.in_progress += 1,
                TaskStatus::Completed => progress.completed += 1,
                TaskStatus::Failed => progress.failed += 1,
                TaskStatus::Blocked | TaskStatus::Skipped => progress.other += 1,
            }
        }

        progress
    }

    /// Disagreements among the reports recorded so far.
    pub fn disagreements(&self) -> Vec<AgentDisagreement> {
        self.evaluator().detect_disagreements(&self.handoff_history)
    }

    /// Merge verdict over the reports recorded so far.
    pub fn evaluate_merge(&self) -> MergeDecision {
        self.evaluator()
            .evaluate_auto_merge(&self.tasks, &self.handoff_history)
    }

    fn evaluator(&self) -> MergeEvaluator {
        MergeEvaluator::new(self.evaluator_config.clone())
    }

    fn complete(&mut self) {
        let merged = merge_handoff_data(&self.handoff_history);
        let header = format!(
            "Completed {} task(s) in {} step(s)",
            self.tasks.len(),
            self.plan.total_steps()
        );
        self.summary = Some(if merged.summary.is_empty() {
            header
        } else {
            format!("{header}\n{}", merged.summary)
        });
        self.merge_decision = Some(self.evaluate_merge());
        self.status = SessionStatus::Completed;
        self.updated_at = Utc::now();
        info!(session_id = %self.id, "orchestration session completed");
    }

    fn transition(&mut self, from: SessionStatus, to: SessionStatus) -> DomainResult<()> {
        if self.status != from {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
                reason: format!("session must be {from}"),
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        info!(session_id = %self.id, status = %to, "session status changed");
        Ok(())
    }

    fn ensure_not_terminal(&self, target: &str) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: target.to_string(),
                reason: "session has finished".to_string(),
            });
        }
        Ok(())
    }
}
