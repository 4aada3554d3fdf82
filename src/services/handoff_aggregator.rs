//! Merges completion reports from many tasks into one view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::models::{Decision, HandoffData};

/// Union of several completion reports.
///
/// File sets are deduplicated and sorted, so they do not depend on input
/// order. Decisions, warnings and summary lines keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedHandoff {
    pub files_modified: BTreeSet<String>,
    pub files_created: BTreeSet<String>,
    pub decisions: Vec<Decision>,
    pub warnings: Vec<String>,
    pub summary: String,
}

impl MergedHandoff {
    pub fn is_empty(&self) -> bool {
        self.files_modified.is_empty()
            && self.files_created.is_empty()
            && self.decisions.is_empty()
            && self.warnings.is_empty()
            && self.summary.is_empty()
    }
}

/// Merge completion reports. Safe to call on a partial history.
pub fn merge_handoff_data(handoffs: &[HandoffData]) -> MergedHandoff {
    let mut merged = MergedHandoff::default();
    let mut lines = Vec::with_capacity(handoffs.len());

    for handoff in handoffs {
        merged
            .files_modified
            .extend(handoff.files_modified.iter().cloned());
        merged
            .files_created
            .extend(handoff.files_created.iter().cloned());
        merged.decisions.extend(handoff.decisions.iter().cloned());
        merged.warnings.extend(handoff.warnings.iter().cloned());
        lines.push(format!("[{}] {}", handoff.worker_tag, handoff.summary));
    }

    merged.summary = lines.join("\n");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::HandoffStatus;

    fn sample() -> Vec<HandoffData> {
        vec![
            HandoffData::new("1", "backend-developer", HandoffStatus::Completed, "Built API")
                .with_files_modified(["src/api.ts", "src/db.ts"])
                .with_files_created(["src/routes.ts"])
                .with_decision(Decision::new("REST over RPC", "Client expects REST"))
                .with_warning("db.ts lacks indexes"),
            HandoffData::new("2", "frontend-developer", HandoffStatus::Completed, "Built UI")
                .with_files_modified(["src/api.ts", "src/ui.tsx"])
                .with_decision(Decision::new("Use hooks", "Simpler state")),
        ]
    }

    #[test]
    fn test_merge_unions_files_and_concatenates_lists() {
        let merged = merge_handoff_data(&sample());

        assert_eq!(
            merged.files_modified.iter().collect::<Vec<_>>(),
            vec!["src/api.ts", "src/db.ts", "src/ui.tsx"]
        );
        assert_eq!(
            merged.files_created.iter().collect::<Vec<_>>(),
            vec!["src/routes.ts"]
        );
        assert_eq!(merged.decisions.len(), 2);
        assert_eq!(merged.decisions[0].description, "REST over RPC");
        assert_eq!(merged.warnings, vec!["db.ts lacks indexes".to_string()]);
        assert_eq!(
            merged.summary,
            "[backend-developer] Built API\n[frontend-developer] Built UI"
        );
    }

    #[test]
    fn test_merge_reversed_input_keeps_file_sets() {
        let forward = merge_handoff_data(&sample());
        let mut reversed_input = sample();
        reversed_input.reverse();
        let reversed = merge_handoff_data(&reversed_input);

        assert_eq!(forward.files_modified, reversed.files_modified);
        assert_eq!(forward.files_created, reversed.files_created);
        assert_eq!(reversed.decisions[0].description, "Use hooks");
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_handoff_data(&[]).is_empty());
    }
}
