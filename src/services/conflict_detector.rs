//! File-overlap heuristics between tasks and between completion reports.
//!
//! Tasks without `estimated_files` are assumed not to conflict. That is not
//! evidence of safety; callers that need stronger guarantees must declare files.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::models::{HandoffData, Task};

/// Stateless detector for declared-file conflicts
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    pub const fn new() -> Self {
        Self
    }

    /// True iff both tasks declare files and the declarations intersect.
    pub fn has_file_conflict(&self, a: &Task, b: &Task) -> bool {
        match (&a.estimated_files, &b.estimated_files) {
            (Some(files_a), Some(files_b)) => !files_a.is_disjoint(files_b),
            _ => false,
        }
    }

    /// Files declared by both tasks, sorted.
    pub fn shared_files(&self, a: &Task, b: &Task) -> Vec<String> {
        match (&a.estimated_files, &b.estimated_files) {
            (Some(files_a), Some(files_b)) => files_a.intersection(files_b).cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Map each file path to the ids of the tasks declaring it, keeping only
    /// paths claimed by two or more tasks.
    pub fn detect_file_overlaps(&self, tasks: &[Task]) -> BTreeMap<String, Vec<String>> {
        let mut claims: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for task in tasks {
            if let Some(files) = &task.estimated_files {
                for file in files {
                    claims.entry(file.clone()).or_default().push(task.id.clone());
                }
            }
        }

        claims.retain(|_, ids| ids.len() > 1);
        claims
    }

    /// Files touched (modified or created) by both reports, sorted.
    pub fn report_overlap(&self, a: &HandoffData, b: &HandoffData) -> Vec<String> {
        let touched_a: BTreeSet<&String> = a.touched_files().collect();
        b.touched_files()
            .filter(|file| touched_a.contains(file))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }
}
