//! Extraction of completion reports from free-form worker output.
//!
//! Workers are asked to end their response with a fenced ```json block
//! holding a `HandoffData`. Anything else is "no report".

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::models::{HandoffData, HandoffStatus, OutcomeSignal, TaskOutcome};
use crate::domain::HandoffParseError;

const REQUIRED_STRING_FIELDS: [&str; 5] = ["taskId", "title", "workerTag", "summary", "completedAt"];

/// Fence labels accepted as structured handoff data.
const STRUCTURED_LABELS: [&str; 2] = ["json", "handoff"];

const FAILURE_MARKERS: [&str; 7] = [
    "failed",
    "failure",
    "error:",
    "unable to",
    "could not",
    "cannot proceed",
    "blocked",
];

const SUCCESS_MARKERS: [&str; 6] = [
    "successfully",
    "completed",
    "all tests pass",
    "task complete",
    "done",
    "finished",
];

/// Return the body of the first fenced block labeled as structured data.
///
/// Handles formats like:
/// - ```json\n{...}\n```
/// - ```handoff\n{...}\n```
pub fn extract_structured_block(text: &str) -> Result<&str, HandoffParseError> {
    let mut offset = 0;
    let mut body_start: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        match body_start {
            None => {
                if let Some(label) = trimmed.strip_prefix("```") {
                    let label = label.trim().to_lowercase();
                    if STRUCTURED_LABELS.contains(&label.as_str()) {
                        body_start = Some(offset + line.len());
                    }
                }
            }
            Some(start) => {
                if trimmed == "```" {
                    return Ok(text[start..offset].trim());
                }
            }
        }
        offset += line.len();
    }

    match body_start {
        Some(_) => Err(HandoffParseError::Malformed(
            "structured block is never closed".to_string(),
        )),
        None => Err(HandoffParseError::NoBlock),
    }
}

/// Validate a JSON value as a completion report.
pub fn validate_handoff(value: Value) -> Result<HandoffData, HandoffParseError> {
    let Some(object) = value.as_object() else {
        return Err(HandoffParseError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    for field in REQUIRED_STRING_FIELDS {
        if object.get(field).and_then(Value::as_str).is_none() {
            return Err(HandoffParseError::MissingField(field));
        }
    }

    let status = object
        .get("status")
        .and_then(Value::as_str)
        .ok_or(HandoffParseError::MissingField("status"))?;
    if HandoffStatus::from_str(status).is_none() {
        return Err(HandoffParseError::InvalidStatus(status.to_string()));
    }

    serde_json::from_value(value).map_err(|e| HandoffParseError::Malformed(e.to_string()))
}

/// Parse and validate the completion report embedded in a worker response.
pub fn parse_handoff(text: &str) -> Result<HandoffData, HandoffParseError> {
    let block = extract_structured_block(text)?;
    let value: Value =
        serde_json::from_str(block).map_err(|e| HandoffParseError::InvalidJson(e.to_string()))?;
    validate_handoff(value)
}

/// Read a success or failure signal from free text.
///
/// Failure markers win over success markers; text with neither is ambiguous.
pub fn infer_outcome(text: &str) -> OutcomeSignal {
    let lowered = text.to_lowercase();

    if FAILURE_MARKERS.iter().any(|m| lowered.contains(m)) {
        OutcomeSignal::Failure
    } else if SUCCESS_MARKERS.iter().any(|m| lowered.contains(m)) {
        OutcomeSignal::Success
    } else {
        OutcomeSignal::Ambiguous
    }
}

/// Turn a worker's raw response into a `TaskOutcome`.
///
/// A valid report decides the outcome by its status. A report naming another
/// task is a failure. Without a report, the free text is scanned and anything
/// short of a clear success counts as failure.
pub fn outcome_from_worker_output(task_id: &str, text: &str) -> TaskOutcome {
    match parse_handoff(text) {
        Ok(handoff) if handoff.task_id != task_id => {
            warn!(
                expected = task_id,
                reported = %handoff.task_id,
                "handoff names a different task id"
            );
            TaskOutcome::failed(
                task_id,
                format!(
                    "completion report is for task {}, expected {task_id}",
                    handoff.task_id
                ),
            )
        }
        Ok(handoff) => TaskOutcome::from_handoff(handoff),
        Err(err) => {
            debug!(task_id, error = %err, "no usable handoff; inferring outcome from text");
            match infer_outcome(text) {
                OutcomeSignal::Success => TaskOutcome::succeeded(task_id),
                OutcomeSignal::Failure => {
                    TaskOutcome::failed(task_id, format!("worker reported failure ({err})"))
                }
                OutcomeSignal::Ambiguous => TaskOutcome::failed(
                    task_id,
                    format!("no completion report and no success signal ({err})"),
                ),
            }
        }
    }
}
