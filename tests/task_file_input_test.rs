//! Loading task and report files the way the CLI does.

mod common;

use relay::cli::commands::{load_report, load_tasks, parse_tasks};
use relay::services::OrchestrationSession;
use std::fs;

const TASKS: &str = r"
tasks:
  - id: schema
    title: Create schema
    assignedWorker: database
    estimatedFiles: [db/schema.sql]
  - id: api
    title: Build API
    assignedWorker: backend
    dependencies: [schema]
    estimatedFiles: [src/api.ts]
  - id: ui
    title: Build UI
    assignedWorker: frontend
    dependencies: [schema]
    estimatedFiles: [src/ui.tsx]
";

#[tokio::test]
async fn test_load_tasks_and_plan() {
    let dir = common::temp_dir();
    let path = dir.path().join("tasks.yaml");
    fs::write(&path, TASKS).unwrap();

    let tasks = load_tasks(&path).await.unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[1].assigned_worker, "backend");

    let session = OrchestrationSession::create(tasks).unwrap();
    assert_eq!(session.plan().total_steps(), 2);
    assert!(session.plan().steps[1].parallel);
}

#[tokio::test]
async fn test_load_tasks_missing_file() {
    let dir = common::temp_dir();
    let err = load_tasks(&dir.path().join("nope.yaml")).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read task file"));
}

#[tokio::test]
async fn test_load_report_from_worker_response() {
    let dir = common::temp_dir();
    let path = dir.path().join("response.md");
    fs::write(
        &path,
        "Done.\n\n```handoff\n{\"taskId\": \"api\", \"title\": \"Build API\", \"workerTag\": \"backend\", \"status\": \"completed\", \"summary\": \"Added routes\", \"completedAt\": \"2024-05-01T12:00:00Z\"}\n```\n",
    )
    .unwrap();

    let report = load_report(&path).await.unwrap();
    assert_eq!(report.task_id, "api");
    assert_eq!(report.summary, "Added routes");
}

#[test]
fn test_json_task_list() {
    let tasks = parse_tasks(r#"[{"id": "1", "title": "One", "status": "completed"}]"#).unwrap();
    assert!(tasks[0].is_completed());
}
