//! Text rendering of handoffs, review requests and disagreement prompts.
//!
//! These are pure formatting functions meant for inclusion in the prompt of
//! the next worker or a human reviewer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::models::{AgentDisagreement, HandoffData, Priority};

/// Focus areas and the keywords that suggest them.
const FOCUS_KEYWORDS: [(&str, &[&str]); 6] = [
    (
        "security",
        &["security", "auth", "password", "token", "secret", "encrypt", "permission"],
    ),
    (
        "performance",
        &["performance", "cache", "latency", "slow", "optimiz"],
    ),
    (
        "data integrity",
        &["database", "migration", "schema", "sql", "transaction"],
    ),
    (
        "API contracts",
        &["api", "endpoint", "interface", "contract", "breaking"],
    ),
    ("test coverage", &["test", "coverage"]),
    ("error handling", &["error", "exception", "retry", "fallback"]),
];

const RESOLUTION_OPTIONS: [&str; 4] = [
    "Adopt one position as-is and record why the others were rejected",
    "Combine the compatible parts of each position",
    "Escalate to a human reviewer",
    "Ask an additional specialist for a tie-breaking opinion",
];

/// A request for review of one task's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub task_id: String,
    pub worker_tag: String,
    pub files: Vec<String>,
    pub focus_areas: Vec<String>,
    pub priority: Priority,
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n### {heading}\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

/// Render a completion report for the next worker's prompt.
///
/// Section order is stable; empty sections are left out.
pub fn render_handoff(handoff: &HandoffData) -> String {
    let mut out = String::new();

    out.push_str(&format!("## Handoff: {} ({})\n", handoff.title, handoff.task_id));
    out.push_str(&format!("**Agent:** {}\n", handoff.worker_tag));
    out.push_str(&format!("**Status:** {}\n", handoff.status));

    out.push_str(&format!("\n### Summary\n{}\n", handoff.summary));

    push_list(&mut out, "Files Modified", &handoff.files_modified);
    push_list(&mut out, "Files Created", &handoff.files_created);

    if !handoff.decisions.is_empty() {
        out.push_str("\n### Key Decisions\n");
        for decision in &handoff.decisions {
            out.push_str(&format!("- {}: {}\n", decision.description, decision.rationale));
            if !decision.alternatives.is_empty() {
                out.push_str(&format!(
                    "  - Alternatives considered: {}\n",
                    decision.alternatives.join(", ")
                ));
            }
            if let Some(impact) = &decision.impact {
                out.push_str(&format!("  - Impact: {impact}\n"));
            }
        }
    }

    if let Some(context) = &handoff.context_for_next {
        push_list(&mut out, "Integration Points", &context.integration_points);
        push_list(&mut out, "Key Patterns", &context.key_patterns);
    }

    push_list(&mut out, "Warnings", &handoff.warnings);
    push_list(&mut out, "Recommendations", &handoff.recommendations);

    out
}

/// Derive a review request from a completion report.
///
/// Focus areas come from keywords in decisions and warnings. Security
/// concerns or an attached error make the review high priority; other
/// warnings or a needs-review status make it medium.
pub fn build_review_request(handoff: &HandoffData) -> ReviewRequest {
    let haystack = handoff
        .decisions
        .iter()
        .flat_map(|d| {
            [d.description.as_str(), d.rationale.as_str()]
                .into_iter()
                .chain(d.impact.as_deref())
        })
        .chain(handoff.warnings.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let focus_areas: Vec<String> = FOCUS_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(area, _)| (*area).to_string())
        .collect();

    let priority = if handoff.error.is_some() || focus_areas.iter().any(|a| a == "security") {
        Priority::High
    } else if !handoff.warnings.is_empty()
        || handoff.status == crate::domain::models::HandoffStatus::NeedsReview
    {
        Priority::Medium
    } else {
        Priority::Low
    };

    let files: BTreeSet<String> = handoff.touched_files().cloned().collect();

    ReviewRequest {
        task_id: handoff.task_id.clone(),
        worker_tag: handoff.worker_tag.clone(),
        files: files.into_iter().collect(),
        focus_areas,
        priority,
    }
}

/// Render a review request as prompt text.
pub fn render_review_request(request: &ReviewRequest) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "## Review Request: task {} by {}\n",
        request.task_id, request.worker_tag
    ));
    out.push_str(&format!("**Priority:** {}\n", request.priority));

    push_list(&mut out, "Files to Review", &request.files);

    out.push_str("\n### Focus Areas\n");
    if request.focus_areas.is_empty() {
        out.push_str("- General correctness\n");
    } else {
        for area in &request.focus_areas {
            out.push_str(&format!("- {area}\n"));
        }
    }

    out
}

/// Render a prompt asking for a disagreement to be resolved.
pub fn render_disagreement_prompt(disagreement: &AgentDisagreement) -> String {
    let mut out = String::new();

    out.push_str(&format!("## Disagreement: {}\n", disagreement.topic));
    out.push_str(&format!("**File:** {}\n", disagreement.file));
    out.push_str(&format!("**Priority:** {}\n", disagreement.priority));
    out.push_str(&format!("**Involved agents:** {}\n", disagreement.agents.join(", ")));

    out.push_str("\n### Positions\n");
    for (idx, position) in disagreement.positions.iter().enumerate() {
        out.push_str(&format!(
            "{}. **{}** (task {}): {}\n",
            idx + 1,
            position.worker_tag,
            position.task_id,
            position.position
        ));
        out.push_str(&format!("   Rationale: {}\n", position.rationale));
    }

    out.push_str("\n### Resolution Options\n");
    for (idx, option) in RESOLUTION_OPTIONS.iter().enumerate() {
        out.push_str(&format!("{}. {option}\n", idx + 1));
    }

    out
}
