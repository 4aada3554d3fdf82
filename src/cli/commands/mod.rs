//! CLI command implementations.

pub mod check;
pub mod merge;
pub mod plan;
pub mod render;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::domain::models::{HandoffData, Task};
use crate::services::handoff_parser::{self, parse_handoff};

/// A task file is either a bare list or a document with a `tasks` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskFile {
    List(Vec<Task>),
    Document { tasks: Vec<Task> },
}

/// Parse task definitions from YAML or JSON text.
pub fn parse_tasks(content: &str) -> Result<Vec<Task>> {
    let file: TaskFile =
        serde_yaml::from_str(content).context("Task file must be a list of tasks or have a `tasks` key")?;
    Ok(match file {
        TaskFile::List(tasks) | TaskFile::Document { tasks } => tasks,
    })
}

/// Read task definitions from a YAML or JSON file.
pub async fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read task file {}", path.display()))?;
    let tasks = parse_tasks(&content).with_context(|| format!("Invalid task file {}", path.display()))?;
    debug!(path = %path.display(), count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

/// Parse a completion report from a worker response or a bare report document.
///
/// A fenced structured block wins; otherwise the whole text is read as a
/// JSON or YAML report.
pub fn parse_report(content: &str) -> Result<HandoffData> {
    match parse_handoff(content) {
        Ok(handoff) => Ok(handoff),
        Err(crate::domain::HandoffParseError::NoBlock) => {
            let value: serde_json::Value =
                serde_yaml::from_str(content).context("Report is neither a fenced block nor a document")?;
            handoff_parser::validate_handoff(value).context("Invalid completion report")
        }
        Err(err) => Err(err).context("Invalid completion report block"),
    }
}

/// Read a completion report from a file.
pub async fn load_report(path: &Path) -> Result<HandoffData> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    parse_report(&content).with_context(|| format!("Invalid report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_list() {
        let yaml = r"
- id: '1'
  title: Schema
  estimatedFiles: [db/schema.sql]
- id: '2'
  title: API
  dependencies: ['1']
";
        let tasks = parse_tasks(yaml).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].dependencies, vec!["1".to_string()]);
        assert!(tasks[0].estimated_files.as_ref().unwrap().contains("db/schema.sql"));
    }

    #[test]
    fn test_parse_task_document_json() {
        let json = r#"{"tasks": [{"id": "a", "title": "A", "priority": 3}]}"#;
        let tasks = parse_tasks(json).unwrap();
        assert_eq!(tasks[0].priority, 3);
    }

    #[test]
    fn test_parse_tasks_rejects_garbage() {
        assert!(parse_tasks("just: [a, string").is_err());
    }

    #[test]
    fn test_parse_bare_report() {
        let yaml = r"
taskId: '7'
title: Docs
workerTag: writer
status: completed
summary: Wrote the guide
completedAt: 2024-05-01T12:00:00Z
filesCreated: [docs/guide.md]
";
        let report = parse_report(yaml).unwrap();
        assert_eq!(report.task_id, "7");
        assert_eq!(report.files_created, vec!["docs/guide.md".to_string()]);
    }

    #[test]
    fn test_parse_report_with_broken_block_fails() {
        assert!(parse_report("```json\n{oops}\n```").is_err());
    }
}
