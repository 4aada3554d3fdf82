//! Domain errors for the Relay orchestration engine.

use thiserror::Error;

/// Format a cycle path as a human-readable string: `a -> b -> a`.
fn format_cycle_path(path: &[String]) -> String {
    let mut rendered = path.join(" -> ");
    if let Some(first) = path.first() {
        rendered.push_str(" -> ");
        rendered.push_str(first);
    }
    rendered
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| format_cycle_path(cycle))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Domain-level errors that can occur while planning or running a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("Task {0} depends on itself")]
    SelfDependency(String),

    #[error("Task {task_id} depends on unknown task {dependency}")]
    UnknownDependency { task_id: String, dependency: String },

    #[error("Task dependency cycle detected: {}", format_cycles(.0))]
    DependencyCycle(Vec<Vec<String>>),

    #[error("Planning stalled with {} unscheduled task(s): {}", .unscheduled.len(), .unscheduled.join(", "))]
    PlanningStalled { unscheduled: Vec<String> },

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Reasons a worker's free-form output did not yield a usable completion report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandoffParseError {
    #[error("no structured handoff block found")]
    NoBlock,

    #[error("handoff block is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("handoff block is missing required string field '{0}'")]
    MissingField(&'static str),

    #[error("handoff status '{0}' is not one of completed, blocked, needs-review, failed")]
    InvalidStatus(String),

    #[error("handoff block is malformed: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_closes_loop() {
        let err = DomainError::DependencyCycle(vec![vec!["a".into(), "b".into()]]);
        assert_eq!(
            err.to_string(),
            "Task dependency cycle detected: a -> b -> a"
        );
    }

    #[test]
    fn test_stall_message_lists_ids() {
        let err = DomainError::PlanningStalled {
            unscheduled: vec!["3".into(), "4".into()],
        };
        assert_eq!(
            err.to_string(),
            "Planning stalled with 2 unscheduled task(s): 3, 4"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            DomainError::from(err),
            DomainError::SerializationError(_)
        ));
    }
}
