//! Task graph — named tasks with declared dependencies, executed either
//! strictly sequentially or with the maximum concurrency the dependency
//! relation permits.
//!
//! - `execute` runs plan order one task at a time and fails fast.
//! - `execute_parallel` attempts every schedulable task, waits for all of
//!   them to settle, and surfaces every failure in one aggregate error.

pub mod plan;
pub mod task;

pub use task::{Task, TaskAction};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::conversation::Conversation;
use crate::error::{Error, GraphError, TaskFailure};
use crate::message::Message;

/// Insertion-ordered mapping from task name to task.
#[derive(Debug, Default)]
pub struct TaskGraph {
    tasks: HashMap<String, Arc<Task>>,
    order: Vec<String>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing any previous descriptor with the same
    /// name. Replacement keeps the original registration position.
    pub fn add(&mut self, task: Task) {
        let name = task.name().to_string();
        if self.tasks.insert(name.clone(), Arc::new(task)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Task>> {
        self.tasks.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Remove a task by name. Returns whether it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.tasks.remove(name).is_some() {
            self.order.retain(|n| n != name);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Compute the execution plan from the current graph state.
    ///
    /// Derived fresh on every call — mutations between calls are reflected.
    pub fn plan(&self) -> Result<Vec<String>, GraphError> {
        plan::compute(&self.order, &self.tasks)
    }

    /// Run all registered tasks in dependency order, one at a time.
    ///
    /// Fails fast: the first task failure is returned wrapped with the
    /// task's name, and tasks after the failure point do not run.
    pub async fn execute(
        &self,
        message: &Arc<Message>,
        context: &Arc<Conversation>,
    ) -> Result<(), GraphError> {
        let plan = self.plan()?;
        debug!(tasks = plan.len(), "executing graph sequentially");

        for name in plan {
            let task = self
                .tasks
                .get(&name)
                .ok_or_else(|| GraphError::TaskNotFound { name: name.clone() })?;
            debug!(task = %name, "running task");
            task.action()
                .run(Arc::clone(message), Arc::clone(context))
                .await
                .map_err(|source| GraphError::TaskFailed {
                    task: name,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    /// Run all registered tasks with maximum legal concurrency.
    ///
    /// Every plan node gets a settle signal up front, keyed by name, so
    /// waiting on a dependency is well-defined before that dependency's unit
    /// has even been scheduled. A unit first awaits the signals of its
    /// declared dependencies, then runs its action, then fires its own
    /// signal — on success and failure alike, so dependents of a failed task
    /// are released rather than cancelled. Does not fail fast: after every
    /// unit has settled, all failures are surfaced together.
    pub async fn execute_parallel(
        &self,
        message: &Arc<Message>,
        context: &Arc<Conversation>,
    ) -> Result<(), GraphError> {
        let plan = self.plan()?;
        debug!(tasks = plan.len(), "executing graph in parallel");

        let mut senders: HashMap<String, watch::Sender<bool>> = HashMap::with_capacity(plan.len());
        let mut receivers: HashMap<String, watch::Receiver<bool>> =
            HashMap::with_capacity(plan.len());
        for name in &plan {
            let (tx, rx) = watch::channel(false);
            senders.insert(name.clone(), tx);
            receivers.insert(name.clone(), rx);
        }

        let mut units = Vec::with_capacity(plan.len());
        for name in plan {
            let task = self
                .tasks
                .get(&name)
                .map(Arc::clone)
                .ok_or_else(|| GraphError::TaskNotFound { name: name.clone() })?;
            let settled = senders
                .remove(&name)
                .ok_or_else(|| GraphError::TaskNotFound { name: name.clone() })?;
            let mut dep_waits = Vec::with_capacity(task.dependencies().len());
            for dep in task.dependencies() {
                let rx = receivers
                    .get(dep)
                    .cloned()
                    .ok_or_else(|| GraphError::TaskNotFound { name: dep.clone() })?;
                dep_waits.push(rx);
            }

            let message = Arc::clone(message);
            let context = Arc::clone(context);
            let handle = tokio::spawn(async move {
                for mut wait in dep_waits {
                    // A dropped sender (panicked unit) also releases the wait.
                    let _ = wait.wait_for(|done| *done).await;
                }
                let result = task.action().run(message, context).await;
                let _ = settled.send(true);
                result
            });
            units.push((name, handle));
        }

        let mut failures = Vec::new();
        for (name, handle) in units {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(task = %name, error = %error, "task failed");
                    failures.push(TaskFailure { task: name, error });
                }
                Err(join_error) => {
                    warn!(task = %name, error = %join_error, "task unit panicked");
                    failures.push(TaskFailure {
                        task: name,
                        error: Error::TaskPanic(join_error.to_string()),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Aggregate { failures })
        }
    }
}
