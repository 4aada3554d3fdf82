use crate::domain::models::{Task, TaskStatus};
use crate::domain::{DomainError, DomainResult};
use std::collections::{HashMap, HashSet};

/// Adjacency map from task id to the ids it depends on.
///
/// Dependency ids that do not name a task in the input are kept as opaque
/// references; they simply have no outgoing edges of their own.
pub type DependencyGraph = HashMap<String, Vec<String>>;

/// Service for resolving task dependencies and detecting circular dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver;

// Standalone helper for cycle detection (no self needed)
fn collect_cycles_util(
    node: &str,
    graph: &DependencyGraph,
    visited: &mut HashSet<String>,
    rec_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
    cycles: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
) {
    visited.insert(node.to_string());
    rec_stack.insert(node.to_string());
    path.push(node.to_string());

    if let Some(neighbors) = graph.get(node) {
        for neighbor in neighbors {
            if rec_stack.contains(neighbor) {
                // Back edge: the path from the neighbor onwards is a cycle
                if let Some(cycle_start) = path.iter().position(|id| id == neighbor) {
                    let cycle = path[cycle_start..].to_vec();
                    if seen.insert(canonical_rotation(&cycle)) {
                        cycles.push(cycle);
                    }
                }
            } else if !visited.contains(neighbor) {
                collect_cycles_util(neighbor, graph, visited, rec_stack, path, cycles, seen);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
}

/// Rotate a cycle so its smallest id comes first, for de-duplication.
fn canonical_rotation(cycle: &[String]) -> Vec<String> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map_or(0, |(idx, _)| idx);
    cycle[start..]
        .iter()
        .chain(cycle[..start].iter())
        .cloned()
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done,
}

impl DependencyResolver {
    pub const fn new() -> Self {
        Self
    }

    /// Build the task id -> dependency ids adjacency map.
    ///
    /// Duplicate dependency entries on one task are collapsed, keeping the
    /// first occurrence so traversal order follows declaration order.
    pub fn build_graph(&self, tasks: &[Task]) -> DependencyGraph {
        let mut graph: DependencyGraph = HashMap::with_capacity(tasks.len());

        for task in tasks {
            let deps = graph.entry(task.id.clone()).or_default();
            for dep in &task.dependencies {
                if !deps.contains(dep) {
                    deps.push(dep.clone());
                }
            }
        }

        graph
    }

    /// Find every distinct dependency cycle.
    ///
    /// Each cycle is listed starting at the first repeated node on the DFS
    /// path. An acyclic task set yields an empty list.
    pub fn detect_cycles(&self, tasks: &[Task]) -> Vec<Vec<String>> {
        let graph = self.build_graph(tasks);

        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();
        let mut cycles = Vec::new();
        let mut seen = HashSet::new();

        // Iterate in input order so results are deterministic
        for task in tasks {
            if !visited.contains(&task.id) {
                collect_cycles_util(
                    &task.id,
                    &graph,
                    &mut visited,
                    &mut rec_stack,
                    &mut path,
                    &mut cycles,
                    &mut seen,
                );
            }
        }

        cycles
    }

    /// Validate a task set before planning.
    ///
    /// Rejects duplicate ids, self-dependencies, dependencies on ids outside
    /// the set, and dependency cycles, in that order.
    pub fn validate(&self, tasks: &[Task]) -> DomainResult<()> {
        let mut ids: HashSet<&str> = HashSet::with_capacity(tasks.len());
        for task in tasks {
            if !ids.insert(task.id.as_str()) {
                return Err(DomainError::DuplicateTaskId(task.id.clone()));
            }
        }

        for task in tasks {
            for dep in &task.dependencies {
                if *dep == task.id {
                    return Err(DomainError::SelfDependency(task.id.clone()));
                }
                if !ids.contains(dep.as_str()) {
                    return Err(DomainError::UnknownDependency {
                        task_id: task.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let cycles = self.detect_cycles(tasks);
        if !cycles.is_empty() {
            return Err(DomainError::DependencyCycle(cycles));
        }

        Ok(())
    }

    /// Tasks that can start now: startable status and every dependency completed.
    ///
    /// Unknown dependency ids never count as satisfied.
    pub fn ready_tasks<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let status_by_id: HashMap<&str, TaskStatus> =
            tasks.iter().map(|t| (t.id.as_str(), t.status)).collect();

        tasks
            .iter()
            .filter(|task| task.status.is_startable())
            .filter(|task| {
                task.dependencies.iter().all(|dep| {
                    status_by_id.get(dep.as_str()) == Some(&TaskStatus::Completed)
                })
            })
            .collect()
    }

    /// Perform topological sort on tasks based on dependencies
    /// Returns tasks in dependency order (dependencies before dependents)
    ///
    /// Tasks are visited in ascending priority order (stable for ties), so
    /// among tasks without a relative constraint the lower priority number
    /// is placed first. Unknown dependency ids are skipped.
    pub fn topological_sort(&self, tasks: &[Task]) -> DomainResult<Vec<Task>> {
        let task_map: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut by_priority: Vec<&Task> = tasks.iter().collect();
        by_priority.sort_by_key(|t| t.priority);

        let mut state: HashMap<&str, VisitState> = HashMap::with_capacity(tasks.len());
        let mut sorted: Vec<Task> = Vec::with_capacity(tasks.len());

        for task in by_priority {
            if visit(task, &task_map, &mut state, &mut sorted).is_err() {
                return Err(DomainError::DependencyCycle(self.detect_cycles(tasks)));
            }
        }

        Ok(sorted)
    }

    /// Calculate the dependency depth for a task
    /// Returns the length of the longest dependency chain beneath it
    pub fn calculate_depth(&self, task_id: &str, all_tasks: &[Task]) -> DomainResult<usize> {
        let task_map: HashMap<&str, &Task> =
            all_tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        let task = task_map
            .get(task_id)
            .ok_or_else(|| DomainError::TaskNotFound(task_id.to_string()))?;
        let mut visited = HashSet::new();
        calculate_depth_recursive(task, &task_map, &mut visited)
    }

    /// Ids of tasks that list `task_id` as a dependency.
    pub fn dependents_of<'a>(&self, task_id: &str, tasks: &'a [Task]) -> Vec<&'a str> {
        tasks
            .iter()
            .filter(|t| t.depends_on(task_id))
            .map(|t| t.id.as_str())
            .collect()
    }
}

/// Depth-first post-order visit. `Err(())` signals a back edge.
fn visit<'a>(
    task: &'a Task,
    task_map: &HashMap<&'a str, &'a Task>,
    state: &mut HashMap<&'a str, VisitState>,
    sorted: &mut Vec<Task>,
) -> Result<(), ()> {
    match state.get(task.id.as_str()) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::Visiting) => return Err(()),
        None => {}
    }

    state.insert(task.id.as_str(), VisitState::Visiting);
    for dep in &task.dependencies {
        if let Some(&dep_task) = task_map.get(dep.as_str()) {
            visit(dep_task, task_map, state, sorted)?;
        }
    }
    state.insert(task.id.as_str(), VisitState::Done);
    sorted.push(task.clone());
    Ok(())
}

// Standalone helper for depth calculation
fn calculate_depth_recursive(
    task: &Task,
    task_map: &HashMap<&str, &Task>,
    visited: &mut HashSet<String>,
) -> DomainResult<usize> {
    if visited.contains(&task.id) {
        return Err(DomainError::DependencyCycle(vec![visited
            .iter()
            .cloned()
            .collect()]));
    }

    visited.insert(task.id.clone());

    let mut max_depth = 0;
    let mut has_known_deps = false;
    for dep_id in &task.dependencies {
        if let Some(&dep_task) = task_map.get(dep_id.as_str()) {
            has_known_deps = true;
            max_depth = max_depth.max(calculate_depth_recursive(dep_task, task_map, visited)?);
        }
    }

    visited.remove(&task.id);
    Ok(if has_known_deps { max_depth + 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_task(id: &str, dependencies: &[&str]) -> Task {
        Task::new(id, format!("Task {id}")).with_dependencies(dependencies.iter().copied())
    }

    #[test]
    fn test_build_graph_keeps_unknown_references() {
        let resolver = DependencyResolver::new();
        let tasks = vec![create_test_task("1", &["ghost", "ghost"])];

        let graph = resolver.build_graph(&tasks);
        assert_eq!(graph["1"], vec!["ghost".to_string()]);
        assert!(!graph.contains_key("ghost"));
    }

    #[test]
    fn test_detect_cycle_no_cycle() {
        let resolver = DependencyResolver::new();
        let tasks = vec![create_test_task("1", &[]), create_test_task("2", &["1"])];

        assert!(resolver.detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_detect_cycle_two_nodes() {
        let resolver = DependencyResolver::new();
        let tasks = vec![create_test_task("a", &["b"]), create_test_task("b", &["a"])];

        let cycles = resolver.detect_cycles(&tasks);
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_detect_cycle_starts_at_repeated_node() {
        let resolver = DependencyResolver::new();
        // root -> x -> y -> z -> x
        let tasks = vec![
            create_test_task("root", &["x"]),
            create_test_task("x", &["y"]),
            create_test_task("y", &["z"]),
            create_test_task("z", &["x"]),
        ];

        let cycles = resolver.detect_cycles(&tasks);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["x", "y", "z"]);
    }

    #[test]
    fn test_detect_multiple_distinct_cycles() {
        let resolver = DependencyResolver::new();
        let tasks = vec![
            create_test_task("a", &["b"]),
            create_test_task("b", &["a"]),
            create_test_task("c", &["d"]),
            create_test_task("d", &["c"]),
            create_test_task("e", &["e"]),
        ];

        let cycles = resolver.detect_cycles(&tasks);
        assert_eq!(cycles.len(), 3);
        assert!(cycles.contains(&vec!["e".to_string()]));
    }

    #[test]
    fn test_validate_errors_in_order() {
        let resolver = DependencyResolver::new();

        let dup = vec![create_test_task("1", &[]), create_test_task("1", &[])];
        assert_eq!(
            resolver.validate(&dup),
            Err(DomainError::DuplicateTaskId("1".into()))
        );

        let self_dep = vec![create_test_task("1", &["1"])];
        assert_eq!(
            resolver.validate(&self_dep),
            Err(DomainError::SelfDependency("1".into()))
        );

        let unknown = vec![create_test_task("1", &["9"])];
        assert_eq!(
            resolver.validate(&unknown),
            Err(DomainError::UnknownDependency {
                task_id: "1".into(),
                dependency: "9".into()
            })
        );

        let cyclic = vec![create_test_task("a", &["b"]), create_test_task("b", &["a"])];
        assert!(matches!(
            resolver.validate(&cyclic),
            Err(DomainError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_ready_tasks() {
        let resolver = DependencyResolver::new();
        let tasks = vec![
            create_test_task("1", &[]).with_status(TaskStatus::Completed),
            create_test_task("2", &["1"]),
            create_test_task("3", &["2"]),
            create_test_task("4", &["missing"]),
            create_test_task("5", &[]).with_status(TaskStatus::InProgress),
            create_test_task("6", &["1"]).with_status(TaskStatus::Ready),
        ];

        let ready: Vec<&str> = resolver
            .ready_tasks(&tasks)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ready, vec!["2", "6"]);
    }

    #[test]
    fn test_topological_sort_simple() {
        let resolver = DependencyResolver::new();
        let tasks = vec![
            create_test_task("3", &["2"]),
            create_test_task("1", &[]),
            create_test_task("2", &["1"]),
        ];

        let sorted = resolver.topological_sort(&tasks).unwrap();
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_topological_sort_priority_tie_break() {
        let resolver = DependencyResolver::new();
        let tasks = vec![
            create_test_task("low", &[]).with_priority(5),
            create_test_task("high", &[]).with_priority(1),
            create_test_task("child", &["low"]).with_priority(0),
        ];

        let sorted = resolver.topological_sort(&tasks).unwrap();
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        // child has the best priority but must follow its dependency
        assert_eq!(ids, vec!["low", "child", "high"]);
    }

    #[test]
    fn test_topological_sort_with_cycle() {
        let resolver = DependencyResolver::new();
        let tasks = vec![create_test_task("a", &["b"]), create_test_task("b", &["a"])];

        assert!(matches!(
            resolver.topological_sort(&tasks),
            Err(DomainError::DependencyCycle(cycles)) if !cycles.is_empty()
        ));
    }

    #[test]
    fn test_calculate_depth() {
        let resolver = DependencyResolver::new();
        let all_tasks = vec![
            create_test_task("1", &[]),
            create_test_task("2", &["1"]),
            create_test_task("3", &["2", "1"]),
        ];

        assert_eq!(resolver.calculate_depth("1", &all_tasks).unwrap(), 0);
        assert_eq!(resolver.calculate_depth("2", &all_tasks).unwrap(), 1);
        assert_eq!(resolver.calculate_depth("3", &all_tasks).unwrap(), 2);
        assert!(matches!(
            resolver.calculate_depth("nope", &all_tasks),
            Err(DomainError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_dependents_of() {
        let resolver = DependencyResolver::new();
        let tasks = vec![
            create_test_task("1", &[]),
            create_test_task("2", &["1"]),
            create_test_task("3", &["1"]),
        ];

        assert_eq!(resolver.dependents_of("1", &tasks), vec!["2", "3"]);
        assert!(resolver.dependents_of("3", &tasks).is_empty());
    }
}
