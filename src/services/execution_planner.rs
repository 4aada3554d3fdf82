//! Execution Planner Service
//!
//! Turns a task set into ordered steps. Each round takes the tasks whose
//! dependencies were all placed in earlier steps and partitions them greedily
//! into conflict-free groups. The grouping is deterministic but not
//! guaranteed to use the minimum number of steps.

use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use super::conflict_detector::ConflictDetector;
use super::execution_plan::{ExecutionPlan, ExecutionStep};
use crate::domain::models::{PlannerConfig, Task};
use crate::domain::{DomainError, DomainResult};

/// Service for building execution plans
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlanner {
    config: PlannerConfig,
    detector: ConflictDetector,
}

impl ExecutionPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            detector: ConflictDetector::new(),
        }
    }

    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan the given tasks into steps.
    ///
    /// Input order decides the order of tasks within a round, so callers
    /// normally pass a topologically sorted list. If a round finds nothing
    /// ready while tasks remain (a cycle, or a dependency outside the set),
    /// planning fails with `PlanningStalled` instead of returning a partial
    /// plan.
    #[instrument(skip(self, tasks), fields(task_count = tasks.len()))]
    pub fn plan(&self, tasks: &[Task]) -> DomainResult<ExecutionPlan> {
        let mut placed: HashSet<&str> = HashSet::with_capacity(tasks.len());
        let mut remaining: Vec<&Task> = tasks.iter().collect();
        let mut steps: Vec<ExecutionStep> = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&Task>, Vec<&Task>) = remaining
                .into_iter()
                .partition(|task| task.dependencies.iter().all(|dep| placed.contains(dep.as_str())));

            if ready.is_empty() {
                let unscheduled: Vec<String> = blocked.iter().map(|t| t.id.clone()).collect();
                warn!(
                    unscheduled = ?unscheduled,
                    "planning stalled: no remaining task has its dependencies satisfied"
                );
                return Err(DomainError::PlanningStalled { unscheduled });
            }

            for group in self.group_ready(&ready) {
                let step_index = steps.len();
                let step = self.build_step(step_index, &group, &ready);
                debug!(
                    step = step_index,
                    parallel = step.parallel,
                    tasks = ?step.task_ids,
                    "planned step"
                );
                steps.push(step);
            }

            // Groups from this round become visible only to the next round
            placed.extend(ready.iter().map(|t| t.id.as_str()));
            remaining = blocked;
        }

        Ok(ExecutionPlan::new(steps))
    }

    /// Greedy partition of one round's ready tasks into conflict-free groups.
    fn group_ready<'a>(&self, ready: &[&'a Task]) -> Vec<Vec<&'a Task>> {
        let mut grouped = vec![false; ready.len()];
        let mut groups = Vec::new();

        for i in 0..ready.len() {
            if grouped[i] {
                continue;
            }
            grouped[i] = true;
            let mut group = vec![ready[i]];

            if self.config.allow_parallel {
                for j in (i + 1)..ready.len() {
                    if self.group_full(group.len()) {
                        break;
                    }
                    if grouped[j] {
                        continue;
                    }
                    let candidate = ready[j];
                    if group
                        .iter()
                        .all(|member| !self.detector.has_file_conflict(member, candidate))
                    {
                        grouped[j] = true;
                        group.push(candidate);
                    }
                }
            }

            groups.push(group);
        }

        groups
    }

    const fn group_full(&self, size: usize) -> bool {
        self.config.max_parallel_tasks > 0 && size >= self.config.max_parallel_tasks
    }

    fn build_step(&self, index: usize, group: &[&Task], round: &[&Task]) -> ExecutionStep {
        let ids = group.iter().map(|t| t.id.clone()).collect();
        let step = ExecutionStep::new(index, ids);

        if group.len() > 1 || round.len() == 1 {
            return step;
        }

        let task = group[0];
        let conflicting: Vec<&str> = round
            .iter()
            .filter(|other| other.id != task.id && self.detector.has_file_conflict(task, other))
            .map(|other| other.id.as_str())
            .collect();

        if !conflicting.is_empty() {
            step.with_sequential_reason(format!(
                "shares files with {}",
                conflicting.join(", ")
            ))
        } else if !self.config.allow_parallel {
            step.with_sequential_reason("parallel execution disabled")
        } else {
            step.with_sequential_reason("parallel group limit reached")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_ids(plan: &ExecutionPlan) -> Vec<Vec<&str>> {
        plan.steps
            .iter()
            .map(|s| s.task_ids.iter().map(String::as_str).collect())
            .collect()
    }

    fn fan_out(shared: bool) -> Vec<Task> {
        let second = if shared { "src/shared.ts" } else { "src/three.ts" };
        vec![
            Task::new("1", "Root"),
            Task::new("2", "Left")
                .with_dependencies(["1"])
                .with_estimated_files(["src/shared.ts"]),
            Task::new("3", "Right")
                .with_dependencies(["1"])
                .with_estimated_files([second]),
        ]
    }

    #[test]
    fn test_disjoint_fan_out_runs_in_parallel() {
        let planner = ExecutionPlanner::default();
        let plan = planner.plan(&fan_out(false)).unwrap();

        assert_eq!(step_ids(&plan), vec![vec!["1"], vec!["2", "3"]]);
        assert!(!plan.steps[0].parallel);
        assert!(plan.steps[0].sequential_reason.is_none());
        assert!(plan.steps[1].parallel);
    }

    #[test]
    fn test_conflicting_fan_out_runs_sequentially() {
        let planner = ExecutionPlanner::default();
        let plan = planner.plan(&fan_out(true)).unwrap();

        assert_eq!(step_ids(&plan), vec![vec!["1"], vec!["2"], vec!["3"]]);
        assert!(plan.steps.iter().all(|s| !s.parallel));
        assert_eq!(
            plan.steps[1].sequential_reason.as_deref(),
            Some("shares files with 3")
        );
    }

    #[test]
    fn test_greedy_grouping_skips_conflicts_but_keeps_scanning() {
        let planner = ExecutionPlanner::default();
        let tasks = vec![
            Task::new("a", "A").with_estimated_files(["x"]),
            Task::new("b", "B").with_estimated_files(["x"]),
            Task::new("c", "C").with_estimated_files(["y"]),
            Task::new("d", "D"),
        ];

        let plan = planner.plan(&tasks).unwrap();
        assert_eq!(step_ids(&plan), vec![vec!["a", "c", "d"], vec!["b"]]);
        assert!(plan.validate(&tasks).is_ok());
    }

    #[test]
    fn test_cycle_stalls_planning() {
        let planner = ExecutionPlanner::default();
        let tasks = vec![
            Task::new("ok", "Fine"),
            Task::new("a", "A").with_dependencies(["b"]),
            Task::new("b", "B").with_dependencies(["a"]),
        ];

        assert_eq!(
            planner.plan(&tasks),
            Err(DomainError::PlanningStalled {
                unscheduled: vec!["a".into(), "b".into()]
            })
        );
    }

    #[test]
    fn test_unknown_dependency_stalls_planning() {
        let planner = ExecutionPlanner::default();
        let tasks = vec![Task::new("1", "One").with_dependencies(["ghost"])];

        assert!(matches!(
            planner.plan(&tasks),
            Err(DomainError::PlanningStalled { .. })
        ));
    }

    #[test]
    fn test_parallel_disabled() {
        let planner = ExecutionPlanner::new(PlannerConfig {
            allow_parallel: false,
            max_parallel_tasks: 0,
        });
        let plan = planner.plan(&fan_out(false)).unwrap();

        assert_eq!(step_ids(&plan), vec![vec!["1"], vec!["2"], vec!["3"]]);
        assert_eq!(
            plan.steps[1].sequential_reason.as_deref(),
            Some("parallel execution disabled")
        );
    }

    #[test]
    fn test_max_parallel_tasks_caps_groups() {
        let planner = ExecutionPlanner::new(PlannerConfig {
            allow_parallel: true,
            max_parallel_tasks: 2,
        });
        let tasks: Vec<Task> = (1..=5).map(|i| Task::new(i.to_string(), "T")).collect();

        let plan = planner.plan(&tasks).unwrap();
        assert_eq!(
            step_ids(&plan),
            vec![vec!["1", "2"], vec!["3", "4"], vec!["5"]]
        );
        assert_eq!(
            plan.steps[2].sequential_reason.as_deref(),
            Some("parallel group limit reached")
        );
    }

    #[test]
    fn test_empty_input_yields_empty_plan() {
        let plan = ExecutionPlanner::default().plan(&[]).unwrap();
        assert!(plan.is_empty());
    }
}
