//! Execution-plan computation — iterative three-color DFS with cycle capture.
//!
//! The plan is a total ordering of every registered task name in which each
//! task appears after all of its dependencies. Ties between independent
//! subgraphs break by registration order. Computed fresh on every execution
//! call; never cached.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GraphError;
use crate::graph::task::Task;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Finished,
}

enum Frame<'a> {
    Enter(&'a str),
    Exit(&'a str),
}

/// Compute the execution plan for every task in `order` (registration order).
///
/// Uses an explicit frame stack rather than recursion so deep dependency
/// chains cannot overflow the call stack. Invariants:
/// - a `Finished` node is already placed: visiting it is a no-op;
/// - an `InProgress` node is on the current exploration path: visiting it is
///   a cycle, reported as the path from its first occurrence back to itself;
/// - a dependency name with no registered task is a hard error, never
///   treated as already satisfied.
pub(crate) fn compute(
    order: &[String],
    tasks: &HashMap<String, Arc<Task>>,
) -> Result<Vec<String>, GraphError> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(tasks.len());
    let mut path: Vec<&str> = Vec::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut plan: Vec<String> = Vec::with_capacity(tasks.len());

    for root in order {
        stack.push(Frame::Enter(root));

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(name) => {
                    match marks.get(name) {
                        Some(Mark::Finished) => continue,
                        Some(Mark::InProgress) => {
                            let first = path
                                .iter()
                                .position(|n| *n == name)
                                .unwrap_or_default();
                            let mut cycle: Vec<String> =
                                path[first..].iter().map(|n| n.to_string()).collect();
                            cycle.push(name.to_string());
                            return Err(GraphError::Cycle { path: cycle });
                        }
                        None => {}
                    }

                    let task = tasks.get(name).ok_or_else(|| GraphError::TaskNotFound {
                        name: name.to_string(),
                    })?;

                    marks.insert(name, Mark::InProgress);
                    path.push(name);
                    stack.push(Frame::Exit(name));
                    // Reversed so dependencies are visited in declared order.
                    for dep in task.dependencies().iter().rev() {
                        stack.push(Frame::Enter(dep));
                    }
                }
                Frame::Exit(name) => {
                    marks.insert(name, Mark::Finished);
                    path.pop();
                    plan.push(name.to_string());
                }
            }
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str, deps: &[&str]) -> Task {
        Task::from_fn(
            name,
            deps.iter().map(|d| d.to_string()).collect(),
            |_, _| async { Ok(()) },
        )
    }

    fn build(specs: &[(&str, &[&str])]) -> (Vec<String>, HashMap<String, Arc<Task>>) {
        let mut order = Vec::new();
        let mut tasks = HashMap::new();
        for (name, deps) in specs {
            order.push(name.to_string());
            tasks.insert(name.to_string(), Arc::new(noop(name, deps)));
        }
        (order, tasks)
    }

    fn index(plan: &[String], name: &str) -> usize {
        plan.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn dependencies_precede_dependents() {
        let (order, tasks) = build(&[
            ("d", &["b", "c"]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("a", &[]),
        ]);
        let plan = compute(&order, &tasks).unwrap();

        assert_eq!(plan.len(), 4);
        assert!(index(&plan, "a") < index(&plan, "b"));
        assert!(index(&plan, "a") < index(&plan, "c"));
        assert!(index(&plan, "b") < index(&plan, "d"));
        assert!(index(&plan, "c") < index(&plan, "d"));
    }

    #[test]
    fn independent_tasks_keep_registration_order() {
        let (order, tasks) = build(&[("x", &[]), ("y", &[]), ("z", &[])]);
        let plan = compute(&order, &tasks).unwrap();
        assert_eq!(plan, vec!["x", "y", "z"]);
    }

    #[test]
    fn two_cycle_reports_repeated_path() {
        let (order, tasks) = build(&[("a", &["b"]), ("b", &["a"])]);
        let err = compute(&order, &tasks).unwrap_err();
        match err {
            GraphError::Cycle { path } => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn three_cycle_reports_full_path() {
        let (order, tasks) = build(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let err = compute(&order, &tasks).unwrap_err();
        match err {
            GraphError::Cycle { path } => assert_eq!(path, vec!["a", "b", "c", "a"]),
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let (order, tasks) = build(&[("a", &["a"])]);
        let err = compute(&order, &tasks).unwrap_err();
        match err {
            GraphError::Cycle { path } => assert_eq!(path, vec!["a", "a"]),
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn cycle_path_excludes_nodes_outside_the_loop() {
        // entry -> a -> b -> a: the reported path starts at the first
        // repetition, not at the traversal root.
        let (order, tasks) = build(&[("entry", &["a"]), ("a", &["b"]), ("b", &["a"])]);
        let err = compute(&order, &tasks).unwrap_err();
        match err {
            GraphError::Cycle { path } => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn unknown_dependency_names_the_missing_task() {
        let (order, tasks) = build(&[("a", &["ghost"])]);
        let err = compute(&order, &tasks).unwrap_err();
        match err {
            GraphError::TaskNotFound { name } => assert_eq!(name, "ghost"),
            other => panic!("expected not-found, got {other}"),
        }
    }

    #[test]
    fn duplicate_dependency_declarations_are_harmless() {
        let (order, tasks) = build(&[("a", &["b", "b"]), ("b", &[])]);
        let plan = compute(&order, &tasks).unwrap();
        assert_eq!(plan, vec!["b", "a"]);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut order = Vec::new();
        let mut tasks = HashMap::new();
        order.push("t0".to_string());
        tasks.insert("t0".to_string(), Arc::new(noop("t0", &[])));
        for i in 1..1000 {
            let name = format!("t{i}");
            let dep = format!("t{}", i - 1);
            order.push(name.clone());
            tasks.insert(name.clone(), Arc::new(noop(&name, &[dep.as_str()])));
        }

        let plan = compute(&order, &tasks).unwrap();
        assert_eq!(plan.len(), 1000);
        assert_eq!(plan.first().map(String::as_str), Some("t0"));
        assert_eq!(plan.last().map(String::as_str), Some("t999"));
    }
}
