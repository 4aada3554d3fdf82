//! Auto-merge verdicts and worker disagreement detection.
//!
//! Both checks are heuristics over the file lists in completion reports.
//! Neither ever looks at file contents.

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::models::{
    AgentDisagreement, AgentPosition, EvaluatorConfig, HandoffData, MergeDecision, Priority, Task,
};

/// Service for deciding whether finished work can be merged automatically
#[derive(Debug, Clone, Default)]
pub struct MergeEvaluator {
    config: EvaluatorConfig,
}

/// Map each modified file to the distinct reports that modified it.
fn reports_by_modified_file(handoffs: &[HandoffData]) -> BTreeMap<&str, Vec<&HandoffData>> {
    let mut by_file: BTreeMap<&str, Vec<&HandoffData>> = BTreeMap::new();
    for handoff in handoffs {
        for file in &handoff.files_modified {
            let entry = by_file.entry(file.as_str()).or_default();
            if !entry.iter().any(|h| std::ptr::eq(*h, handoff)) {
                entry.push(handoff);
            }
        }
    }
    by_file
}

impl MergeEvaluator {
    pub const fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Decide whether the given results can be merged without review.
    ///
    /// Rules, first match wins:
    /// 1. a file modified by more than one report blocks the merge
    /// 2. a failed task blocks the merge
    /// 3. warnings allow the merge but are surfaced as recommendations
    /// 4. otherwise proceed
    pub fn evaluate_auto_merge(&self, tasks: &[Task], handoffs: &[HandoffData]) -> MergeDecision {
        let conflicts: Vec<String> = reports_by_modified_file(handoffs)
            .into_iter()
            .filter(|(_, reports)| reports.len() > 1)
            .map(|(file, _)| file.to_string())
            .collect();

        if !conflicts.is_empty() {
            debug!(conflicts = ?conflicts, "auto-merge blocked by file conflicts");
            return MergeDecision {
                can_auto_merge: false,
                reason: "Multiple workers modified the same files".to_string(),
                recommendations: vec![
                    format!("Manually review conflicting files: {}", conflicts.join(", ")),
                    "Rebase the conflicting changes one worker at a time".to_string(),
                ],
                conflicts,
            };
        }

        let failed: Vec<&str> = tasks
            .iter()
            .filter(|t| t.is_failed())
            .map(|t| t.id.as_str())
            .collect();
        if !failed.is_empty() {
            return MergeDecision {
                can_auto_merge: false,
                reason: format!("Tasks failed: {}", failed.join(", ")),
                conflicts: Vec::new(),
                recommendations: vec!["Resolve or retry the failed tasks before merging".to_string()],
            };
        }

        let warnings: Vec<String> = handoffs
            .iter()
            .flat_map(|h| h.warnings.iter().cloned())
            .collect();
        if !warnings.is_empty() {
            return MergeDecision {
                can_auto_merge: true,
                reason: "All tasks completed with warnings".to_string(),
                conflicts: Vec::new(),
                recommendations: warnings,
            };
        }

        MergeDecision {
            can_auto_merge: true,
            reason: "All tasks completed without conflicts".to_string(),
            conflicts: Vec::new(),
            recommendations: vec!["Proceed with merge".to_string()],
        }
    }

    /// Flag files that several workers modified while also leaving guidance.
    ///
    /// A file qualifies when at least two reports modified it and those
    /// reports together carry more recommendations and warnings than the
    /// configured threshold.
    pub fn detect_disagreements(&self, handoffs: &[HandoffData]) -> Vec<AgentDisagreement> {
        reports_by_modified_file(handoffs)
            .into_iter()
            .filter(|(_, reports)| reports.len() >= 2)
            .filter(|(_, reports)| {
                let guidance: usize = reports
                    .iter()
                    .map(|h| h.recommendations.len() + h.warnings.len())
                    .sum();
                guidance > self.config.disagreement_threshold
            })
            .map(|(file, reports)| AgentDisagreement {
                topic: format!("Conflicting guidance on {file}"),
                file: file.to_string(),
                agents: reports.iter().map(|h| h.worker_tag.clone()).collect(),
                positions: reports.iter().map(|h| position_of(h)).collect(),
                priority: Priority::Medium,
            })
            .collect()
    }
}

fn position_of(handoff: &HandoffData) -> AgentPosition {
    let position = if !handoff.recommendations.is_empty() {
        handoff.recommendations.join("; ")
    } else if !handoff.warnings.is_empty() {
        handoff.warnings.join("; ")
    } else {
        "No recommendation given".to_string()
    };

    AgentPosition {
        worker_tag: handoff.worker_tag.clone(),
        task_id: handoff.task_id.clone(),
        position,
        rationale: handoff.summary.clone(),
    }
}
