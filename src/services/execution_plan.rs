//! Execution Plan for step-wise Task Execution
//!
//! Provides an ordered list of steps. Each step is either a group of
//! non-conflicting tasks that may run concurrently, or a single task that
//! must run alone.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::conflict_detector::ConflictDetector;
use crate::domain::models::Task;
use crate::domain::{DomainError, DomainResult};

/// A step in the execution plan
///
/// When `parallel` is true, no two tasks in the step share a declared file,
/// so an external executor may run them concurrently. Steps are never
/// mutated after the planner emits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    /// Step number (0-indexed)
    pub step: usize,

    /// Ids of the tasks in this step, in planning order
    pub task_ids: Vec<String>,

    pub parallel: bool,

    /// Why a single-task step could not be grouped with its peers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequential_reason: Option<String>,
}

impl ExecutionStep {
    /// Create a new execution step; `parallel` follows the group size
    pub fn new(step: usize, task_ids: Vec<String>) -> Self {
        let parallel = task_ids.len() > 1;
        Self {
            step,
            task_ids,
            parallel,
            sequential_reason: None,
        }
    }

    #[must_use]
    pub fn with_sequential_reason(mut self, reason: impl Into<String>) -> Self {
        self.sequential_reason = Some(reason.into());
        self
    }

    /// Get the number of tasks in this step
    pub fn task_count(&self) -> usize {
        self.task_ids.len()
    }

    /// Check if this step is empty
    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }
}

/// Execution plan: steps in the order they must be run
///
/// # Examples
///
/// ```
/// use relay::services::execution_plan::{ExecutionPlan, ExecutionStep};
///
/// let step0 = ExecutionStep::new(0, vec!["1".to_string()]);
/// let step1 = ExecutionStep::new(1, vec!["2".to_string(), "3".to_string()]);
///
/// let plan = ExecutionPlan::new(vec![step0, step1]);
/// assert_eq!(plan.total_steps(), 2);
/// assert_eq!(plan.total_tasks(), 3);
/// assert!(plan.steps[1].parallel);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Steps of execution in dependency order
    pub steps: Vec<ExecutionStep>,
}

impl ExecutionPlan {
    /// Create a new execution plan
    ///
    /// # Panics
    ///
    /// Panics if steps are not in sequential order starting from 0
    pub fn new(steps: Vec<ExecutionStep>) -> Self {
        for (idx, step) in steps.iter().enumerate() {
            assert_eq!(
                step.step, idx,
                "Execution plan steps must be sequential starting from 0"
            );
        }

        Self { steps }
    }

    /// Create an empty execution plan
    pub const fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Get the total number of steps in the plan
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Get the total number of tasks across all steps
    pub fn total_tasks(&self) -> usize {
        self.steps.iter().map(ExecutionStep::task_count).sum()
    }

    /// Get a specific step by index
    pub fn get_step(&self, step: usize) -> Option<&ExecutionStep> {
        self.steps.get(step)
    }

    /// Check if the plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps that run more than one task
    pub fn parallel_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.parallel).count()
    }

    /// Get all task IDs in the plan
    pub fn all_task_ids(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|step| step.task_ids.iter())
            .map(String::as_str)
            .collect()
    }

    /// Index of the step that holds the given task
    pub fn step_of(&self, task_id: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.contains(task_id))
    }

    /// Validate the execution plan against the tasks it was built from
    ///
    /// Checks that:
    /// - Steps are sequential starting from 0 and non-empty
    /// - Every task appears in exactly one step and no unknown ids appear
    /// - Every task sits in a later step than each of its dependencies
    /// - No two tasks in a parallel step share a declared file
    pub fn validate(&self, tasks: &[Task]) -> DomainResult<()> {
        let mut step_by_id: HashMap<&str, usize> = HashMap::new();

        for (idx, step) in self.steps.iter().enumerate() {
            if step.step != idx {
                return Err(DomainError::ValidationFailed(format!(
                    "Step {idx} has incorrect step number {}",
                    step.step
                )));
            }

            if step.is_empty() {
                return Err(DomainError::ValidationFailed(format!("Step {idx} is empty")));
            }

            if step.parallel != (step.task_count() > 1) {
                return Err(DomainError::ValidationFailed(format!(
                    "Step {idx} parallel flag does not match its size"
                )));
            }

            for id in &step.task_ids {
                if step_by_id.insert(id.as_str(), idx).is_some() {
                    return Err(DomainError::ValidationFailed(format!(
                        "Duplicate task ID found: {id}"
                    )));
                }
            }
        }

        let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        if let Some(unknown) = step_by_id.keys().find(|id| !known.contains(*id)) {
            return Err(DomainError::ValidationFailed(format!(
                "Plan references unknown task {unknown}"
            )));
        }

        for task in tasks {
            let Some(&task_step) = step_by_id.get(task.id.as_str()) else {
                return Err(DomainError::ValidationFailed(format!(
                    "Task {} is missing from the plan",
                    task.id
                )));
            };

            for dep in &task.dependencies {
                if let Some(&dep_step) = step_by_id.get(dep.as_str()) {
                    if dep_step >= task_step {
                        return Err(DomainError::ValidationFailed(format!(
                            "Task {} in step {task_step} does not follow dependency {dep} in step {dep_step}",
                            task.id
                        )));
                    }
                }
            }
        }

        let task_map: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        let detector = ConflictDetector::new();
        for step in self.steps.iter().filter(|s| s.parallel) {
            for (i, a) in step.task_ids.iter().enumerate() {
                for b in &step.task_ids[i + 1..] {
                    if let (Some(ta), Some(tb)) = (task_map.get(a.as_str()), task_map.get(b.as_str())) {
                        if detector.has_file_conflict(ta, tb) {
                            return Err(DomainError::ValidationFailed(format!(
                                "Parallel step {} contains conflicting tasks {a} and {b}",
                                step.step
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
