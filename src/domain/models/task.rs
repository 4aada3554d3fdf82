//! Task domain model.
//!
//! Tasks are discrete units of work assigned to specialist workers.
//! They form a DAG through their dependency lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::handoff::HandoffData;

/// Status of a task within an orchestration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is defined but not yet started
    #[default]
    Pending,
    /// Task dependencies are satisfied
    Ready,
    /// Task has been dispatched to a worker
    InProgress,
    /// Task completed successfully
    Completed,
    /// Task failed
    Failed,
    /// Task cannot proceed
    Blocked,
    /// Task was deliberately not executed
    Skipped,
}

impl TaskStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
            Self::Skipped => "skipped",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "ready" => Some(Self::Ready),
            "in-progress" | "in_progress" | "running" => Some(Self::InProgress),
            "completed" | "complete" | "done" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "blocked" => Some(Self::Blocked),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Check if this is a terminal per-task state.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Whether a task in this state may be picked up once its dependencies are met.
    pub const fn is_startable(&self) -> bool {
        matches!(self, Self::Pending | Self::Ready)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier, may encode hierarchy (e.g. "3.1.2")
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Opaque tag naming the specialist role that should perform the task
    #[serde(default)]
    pub assigned_worker: String,

    /// Ids of tasks that must complete before this one becomes ready
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Lower value = higher priority. Only used as an ordering tie-break.
    #[serde(default)]
    pub priority: i32,

    /// Files the task is expected to touch; feeds conflict heuristics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_files: Option<BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_report: Option<HandoffData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task with no dependencies.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            assigned_worker: String::new(),
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            priority: 0,
            estimated_files: None,
            completion_report: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_worker(mut self, worker: impl Into<String>) -> Self {
        self.assigned_worker = worker.into();
        self
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_estimated_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.estimated_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether this task lists the given id as a dependency.
    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == id)
    }

    pub const fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self.status, TaskStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Ready,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Blocked,
            TaskStatus::Skipped,
        ] {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_str("DONE"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_terminal_and_startable() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Pending.is_startable());
        assert!(TaskStatus::Ready.is_startable());
        assert!(!TaskStatus::Blocked.is_startable());
    }

    #[test]
    fn test_builder() {
        let task = Task::new("3.1", "Wire API")
            .with_worker("backend-developer")
            .with_dependencies(["3"])
            .with_priority(2)
            .with_estimated_files(["src/api.rs"]);

        assert_eq!(task.id, "3.1");
        assert_eq!(task.assigned_worker, "backend-developer");
        assert!(task.depends_on("3"));
        assert!(!task.depends_on("4"));
        assert_eq!(task.priority, 2);
        assert!(task.estimated_files.unwrap().contains("src/api.rs"));
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let yaml = r"
id: '2'
title: Build UI
assignedWorker: frontend-developer
dependencies: ['1']
estimatedFiles: [src/ui.tsx]
";
        let task: Task = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, 0);
        assert_eq!(task.dependencies, vec!["1".to_string()]);
        assert!(task.completion_report.is_none());
    }
}
