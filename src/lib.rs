//! Relay - task orchestration engine
//!
//! Relay turns a set of tasks with dependencies and expected file footprints
//! into a step-by-step execution plan, tracks a session through that plan,
//! and folds the workers' completion reports into a merge verdict.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Models and errors
//! - **Service Layer** (`services`): Planning, conflict detection, handoff handling
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use relay::domain::models::{HandoffData, HandoffStatus, Task, TaskOutcome};
//! use relay::services::OrchestrationSession;
//!
//! let tasks = vec![
//!     Task::new("1", "Schema").with_worker("database"),
//!     Task::new("2", "API").with_worker("backend").with_dependencies(["1"]),
//! ];
//! let mut session = OrchestrationSession::create(tasks).unwrap();
//!
//! while let Some(step) = session.next_tasks() {
//!     let ids: Vec<String> = step.iter().map(|t| t.id.clone()).collect();
//!     for id in ids {
//!         let report = HandoffData::new(&id, "worker", HandoffStatus::Completed, "done");
//!         session.record_task_completion(TaskOutcome::from_handoff(report));
//!     }
//!     session.advance();
//! }
//!
//! assert!(session.merge_decision().unwrap().can_auto_merge);
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, HandoffData, HandoffStatus, MergeDecision, SessionStatus, Task, TaskOutcome,
    TaskStatus,
};
pub use domain::{DomainError, DomainResult, HandoffParseError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DependencyResolver, ExecutionPlan, ExecutionPlanner, OrchestrationSession};
