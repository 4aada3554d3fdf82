//! Merge and disagreement verdicts produced after workers finish.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict on whether completed work from multiple tasks can be combined
/// without manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeDecision {
    pub can_auto_merge: bool,
    pub reason: String,
    /// Files modified by more than one report
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Urgency attached to a disagreement or review request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// One worker's stance on a contested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPosition {
    pub worker_tag: String,
    pub task_id: String,
    pub position: String,
    pub rationale: String,
}

/// Two or more workers gave guidance about the same file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDisagreement {
    pub topic: String,
    pub file: String,
    pub agents: Vec<String>,
    pub positions: Vec<AgentPosition>,
    pub priority: Priority,
}
