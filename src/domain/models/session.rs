//! Domain models for orchestration session state.
//!
//! The session itself lives in `services::orchestration_session`; these are
//! the plain value types it exposes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is accepting results and advancing
    #[default]
    Active,
    /// Caller-initiated hold
    Paused,
    /// Every step finished
    Completed,
    /// A task in the current step failed
    Failed,
}

impl SessionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Terminal states admit no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of session progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub status: SessionStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub total_tasks: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub other: usize,
}

impl SessionProgress {
    /// Fraction of tasks completed, 0.0 for an empty session.
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_ratio(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed as f64 / self.total_tasks as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Paused.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }

    #[test]
    fn test_completion_ratio() {
        let progress = SessionProgress {
            total_tasks: 4,
            completed: 1,
            ..SessionProgress::default()
        };
        assert!((progress.completion_ratio() - 0.25).abs() < f64::EPSILON);
        assert!(SessionProgress::default().completion_ratio().abs() < f64::EPSILON);
    }
}
