//! Results a caller feeds back into a session after running a task.

use serde::{Deserialize, Serialize};

use super::handoff::HandoffData;

/// What a caller observed after a worker ran a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Work finished; the report is absent when the worker emitted none
    Succeeded {
        task_id: String,
        handoff: Option<HandoffData>,
    },
    Failed {
        task_id: String,
        error: String,
        handoff: Option<HandoffData>,
    },
}

impl TaskOutcome {
    pub fn succeeded(task_id: impl Into<String>) -> Self {
        Self::Succeeded {
            task_id: task_id.into(),
            handoff: None,
        }
    }

    pub fn failed(task_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failed {
            task_id: task_id.into(),
            error: error.into(),
            handoff: None,
        }
    }

    /// Classify a report by its status. Blocked and failed reports are failures.
    pub fn from_handoff(handoff: HandoffData) -> Self {
        if handoff.status.is_success() {
            Self::Succeeded {
                task_id: handoff.task_id.clone(),
                handoff: Some(handoff),
            }
        } else {
            let error = handoff
                .error
                .as_ref()
                .map_or_else(|| handoff.summary.clone(), |e| e.message.clone());
            Self::Failed {
                task_id: handoff.task_id.clone(),
                error,
                handoff: Some(handoff),
            }
        }
    }

    pub fn task_id(&self) -> &str {
        match self {
            Self::Succeeded { task_id, .. } | Self::Failed { task_id, .. } => task_id,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub const fn handoff(&self) -> Option<&HandoffData> {
        match self {
            Self::Succeeded { handoff, .. } | Self::Failed { handoff, .. } => handoff.as_ref(),
        }
    }
}

/// Success signal read from free text when no structured report exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeSignal {
    Success,
    Failure,
    /// Treated as failure by callers
    Ambiguous,
}
