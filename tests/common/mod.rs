//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use relay::domain::models::{HandoffData, HandoffStatus, Task, TaskOutcome};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes a tracing subscriber that writes through the test harness.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A task with dependencies and an optional file footprint.
pub fn task(id: &str, deps: &[&str], files: &[&str]) -> Task {
    let task = Task::new(id, format!("Task {id}"))
        .with_worker(format!("worker-{id}"))
        .with_dependencies(deps.iter().copied());
    if files.is_empty() {
        task
    } else {
        task.with_estimated_files(files.iter().copied())
    }
}

/// A completed report listing modified files.
pub fn report(task_id: &str, worker: &str, modified: &[&str]) -> HandoffData {
    HandoffData::new(
        task_id,
        worker,
        HandoffStatus::Completed,
        format!("{worker} finished task {task_id}"),
    )
    .with_files_modified(modified.iter().copied())
}

/// A successful outcome carrying a report.
pub fn success(task_id: &str, worker: &str, modified: &[&str]) -> TaskOutcome {
    TaskOutcome::from_handoff(report(task_id, worker, modified))
}

/// Ids of a borrowed task list, for terse assertions.
pub fn ids(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}
