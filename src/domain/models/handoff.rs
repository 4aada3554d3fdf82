//! Completion report ("handoff") domain models.
//!
//! A `HandoffData` is produced exactly once per task completion attempt and
//! is the only source of facts the engine uses about finished work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome a worker reports for its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandoffStatus {
    Completed,
    Blocked,
    NeedsReview,
    Failed,
}

impl HandoffStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::NeedsReview => "needs-review",
            Self::Failed => "failed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            "needs-review" => Some(Self::NeedsReview),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the task's work should count as done.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::NeedsReview)
    }
}

impl fmt::Display for HandoffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A design decision recorded by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub description: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

impl Decision {
    pub fn new(description: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            rationale: rationale.into(),
            alternatives: Vec::new(),
            impact: None,
        }
    }
}

/// Error details attached to failed or blocked reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffError {
    pub message: String,
    #[serde(default)]
    pub recoverable: bool,
}

/// Hints for whichever task consumes this task's output next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTaskContext {
    #[serde(default)]
    pub key_patterns: Vec<String>,
    #[serde(default)]
    pub integration_points: Vec<String>,
}

impl NextTaskContext {
    pub fn is_empty(&self) -> bool {
        self.key_patterns.is_empty() && self.integration_points.is_empty()
    }
}

/// Structured completion report returned by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffData {
    pub task_id: String,
    pub title: String,
    pub worker_tag: String,
    pub status: HandoffStatus,
    pub summary: String,
    pub completed_at: DateTime<Utc>,

    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub files_created: Vec<String>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Present only for failed or blocked reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HandoffError>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_for_next: Option<NextTaskContext>,
}

impl HandoffData {
    /// Create a report with only the required fields populated.
    pub fn new(
        task_id: impl Into<String>,
        worker_tag: impl Into<String>,
        status: HandoffStatus,
        summary: impl Into<String>,
    ) -> Self {
        let task_id = task_id.into();
        Self {
            title: task_id.clone(),
            task_id,
            worker_tag: worker_tag.into(),
            status,
            summary: summary.into(),
            completed_at: Utc::now(),
            files_modified: Vec::new(),
            files_created: Vec::new(),
            decisions: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
            error: None,
            context_for_next: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_files_modified<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_modified = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_files_created<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_created = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decisions.push(decision);
        self
    }

    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>, recoverable: bool) -> Self {
        self.error = Some(HandoffError {
            message: message.into(),
            recoverable,
        });
        self
    }

    #[must_use]
    pub fn with_context_for_next(mut self, context: NextTaskContext) -> Self {
        self.context_for_next = Some(context);
        self
    }

    /// Every path this report touched, modified first then created.
    pub fn touched_files(&self) -> impl Iterator<Item = &String> {
        self.files_modified.iter().chain(self.files_created.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            HandoffStatus::from_str("needs-review"),
            Some(HandoffStatus::NeedsReview)
        );
        assert_eq!(HandoffStatus::from_str("done"), None);
        assert!(HandoffStatus::NeedsReview.is_success());
        assert!(!HandoffStatus::Blocked.is_success());
    }

    #[test]
    fn test_deserialize_from_camel_case_json() {
        let json = r#"{
            "taskId": "2",
            "title": "Build API",
            "workerTag": "backend-developer",
            "status": "completed",
            "summary": "Added endpoints",
            "completedAt": "2024-05-01T12:00:00Z",
            "filesModified": ["src/api.rs"],
            "decisions": [{"description": "Use axum", "rationale": "Already in stack"}],
            "contextForNext": {"integrationPoints": ["GET /users"]}
        }"#;

        let handoff: HandoffData = serde_json::from_str(json).unwrap();
        assert_eq!(handoff.task_id, "2");
        assert_eq!(handoff.status, HandoffStatus::Completed);
        assert_eq!(handoff.files_modified, vec!["src/api.rs".to_string()]);
        assert!(handoff.files_created.is_empty());
        assert_eq!(handoff.decisions[0].description, "Use axum");
        let context = handoff.context_for_next.unwrap();
        assert!(context.key_patterns.is_empty());
        assert_eq!(context.integration_points, vec!["GET /users".to_string()]);
    }

    #[test]
    fn test_touched_files_chains_modified_and_created() {
        let handoff = HandoffData::new("1", "tester", HandoffStatus::Completed, "ok")
            .with_files_modified(["a.rs"])
            .with_files_created(["b.rs"]);

        let touched: Vec<&String> = handoff.touched_files().collect();
        assert_eq!(touched, vec!["a.rs", "b.rs"]);
    }
}
