//! Error types for the enrichment core.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Task panicked: {0}")]
    TaskPanic(String),
}

/// Structural and execution errors from the task graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The dependency relation contains a cycle. The path runs from the
    /// first repeated task back to itself, e.g. `a -> b -> c -> a`.
    #[error("task cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// A dependency referenced a name that was never registered.
    #[error("task not found: {name}")]
    TaskNotFound { name: String },

    /// Sequential execution stopped at the first failing task.
    #[error("task {task} failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<Error>,
    },

    /// Parallel execution settled with one or more failed tasks.
    #[error("{} task(s) failed: {}", .failures.len(), summarize(.failures))]
    Aggregate { failures: Vec<TaskFailure> },
}

/// One failed task inside an [`GraphError::Aggregate`].
#[derive(Debug)]
pub struct TaskFailure {
    /// Name of the failed task.
    pub task: String,
    /// The underlying cause.
    pub error: Error,
}

fn summarize(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.task, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Transport and service errors from the completion port.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

/// Errors from the retry-validating enrichment wrapper.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Every attempt produced output that failed to parse or validate.
    #[error("enrichment {key} exhausted {attempts} attempt(s), last error: {reason}")]
    RetriesExhausted {
        key: String,
        attempts: u32,
        reason: String,
    },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for the enrichment core.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_shows_path() {
        let err = GraphError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "task cycle detected: a -> b -> a");
    }

    #[test]
    fn aggregate_display_lists_every_cause() {
        let err = GraphError::Aggregate {
            failures: vec![
                TaskFailure {
                    task: "keywords".into(),
                    error: Error::Completion(CompletionError::Request("timeout".into())),
                },
                TaskFailure {
                    task: "summary".into(),
                    error: Error::TaskPanic("boom".into()),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 task(s) failed"));
        assert!(msg.contains("keywords"));
        assert!(msg.contains("timeout"));
        assert!(msg.contains("summary"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn task_failed_names_the_task() {
        let err = GraphError::TaskFailed {
            task: "entities".into(),
            source: Box::new(Error::Completion(CompletionError::Request("down".into()))),
        };
        assert!(err.to_string().contains("entities"));
        assert!(err.to_string().contains("down"));
    }
}
