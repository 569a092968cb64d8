//! Task descriptor — a named, dependency-constrained unit of async work.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::conversation::Conversation;
use crate::error::Error;
use crate::message::Message;

/// The work a task performs against a message.
///
/// Implementations receive shared handles so the graph can drive many tasks
/// concurrently; the conversation is read-only by convention (see the
/// enrichment wrapper, which clones a private scoped copy for its retry
/// dialogue).
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(&self, message: Arc<Message>, context: Arc<Conversation>) -> Result<(), Error>;
}

/// A named unit of work plus the names of the tasks it depends on.
///
/// Owned by the graph that registered it; immutable once added.
pub struct Task {
    name: String,
    dependencies: Vec<String>,
    action: Arc<dyn TaskAction>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        dependencies: Vec<String>,
        action: Arc<dyn TaskAction>,
    ) -> Self {
        Self {
            name: name.into(),
            dependencies,
            action,
        }
    }

    /// Build a task from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, dependencies: Vec<String>, f: F) -> Self
    where
        F: Fn(Arc<Message>, Arc<Conversation>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let boxed = move |message: Arc<Message>,
                          context: Arc<Conversation>|
              -> BoxFuture<'static, Result<(), Error>> {
            Box::pin(f(message, context))
        };
        Self::new(name, dependencies, Arc::new(FnAction { f: Box::new(boxed) }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn action(&self) -> &Arc<dyn TaskAction> {
        &self.action
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

type BoxedActionFn =
    Box<dyn Fn(Arc<Message>, Arc<Conversation>) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

struct FnAction {
    f: BoxedActionFn,
}

#[async_trait]
impl TaskAction for FnAction {
    async fn run(&self, message: Arc<Message>, context: Arc<Conversation>) -> Result<(), Error> {
        (self.f)(message, context).await
    }
}
