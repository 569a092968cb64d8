//! Retry-validating enrichment task.
//!
//! Wraps one semantic extraction (keywords, entities, summary, ...) in a
//! bounded retry loop: ask the completion port for structured output, decode
//! it as JSON, validate it against the task's schema, and on a content-shape
//! failure feed the rejection reason back into a private scoped conversation
//! for a corrected retry. Transport failures are never retried here.
//!
//! The scoped conversation is created fresh per invocation and never aliases
//! the caller-visible context, so a failed or retried extraction cannot
//! corrupt shared history — only the final validated value is written back,
//! onto the message's annotation store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::completion::{CompletionOptions, CompletionPort};
use crate::conversation::{Conversation, Turn};
use crate::enrich::validate::Validator;
use crate::error::{EnrichError, Error};
use crate::graph::{Task, TaskAction};
use crate::message::Message;

/// Default retry budget: total attempts, not retries after the first.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Outcome of decoding and validating one completion response.
///
/// Consumed by the retry loop as data; only transport failures and
/// exhaustion propagate as errors.
enum Checked {
    Valid(Value),
    ParseFailed(String),
    Invalid(String),
}

/// One semantic extraction with a bounded, self-correcting retry loop.
pub struct RetryValidatingTask {
    key: String,
    port: Arc<dyn CompletionPort>,
    validator: Arc<dyn Validator>,
    system_instruction: String,
    max_tries: u32,
    options: CompletionOptions,
}

impl RetryValidatingTask {
    pub fn new(
        key: impl Into<String>,
        port: Arc<dyn CompletionPort>,
        validator: Arc<dyn Validator>,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            port,
            validator,
            system_instruction: system_instruction.into(),
            max_tries: DEFAULT_MAX_TRIES,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Annotation key this task writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wrap into a graph task named after the annotation key.
    pub fn into_task(self, dependencies: Vec<String>) -> Task {
        let name = self.key.clone();
        Task::new(name, dependencies, Arc::new(self))
    }

    fn check(&self, raw: &str) -> Checked {
        match serde_json::from_str::<Value>(strip_fences(raw)) {
            Err(e) => Checked::ParseFailed(format!("output was not valid JSON: {e}")),
            Ok(value) => match self.validator.validate(&value) {
                Ok(()) => Checked::Valid(value),
                Err(reason) => Checked::Invalid(reason),
            },
        }
    }
}

#[async_trait]
impl TaskAction for RetryValidatingTask {
    async fn run(&self, message: Arc<Message>, _context: Arc<Conversation>) -> Result<(), Error> {
        let mut scoped = Conversation::new();
        scoped.push(Turn::system(&self.system_instruction));
        scoped.push(Turn::user(&message.content));

        let mut last_reason = String::new();
        for attempt in 1..=self.max_tries {
            debug!(key = %self.key, attempt, "requesting completion");
            let completion = self.port.complete(&scoped, &self.options).await?;

            match self.check(&completion.turn.content) {
                Checked::Valid(value) => {
                    debug!(
                        key = %self.key,
                        attempt,
                        units = completion.usage.total(),
                        "enrichment validated"
                    );
                    message
                        .set_annotation(self.key.as_str(), value, Some(completion.usage.total()))
                        .await;
                    return Ok(());
                }
                Checked::ParseFailed(reason) | Checked::Invalid(reason) => {
                    warn!(key = %self.key, attempt, reason = %reason, "completion rejected");
                    scoped.push(completion.turn);
                    scoped.push(Turn::user(format!(
                        "Your previous answer was invalid: {reason}. \
                         Answer again with only the corrected output."
                    )));
                    last_reason = reason;
                }
            }
        }

        Err(EnrichError::RetriesExhausted {
            key: self.key.clone(),
            attempts: self.max_tries,
            reason: last_reason,
        }
        .into())
    }
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(fence)
            && let Some(inner) = rest.strip_suffix("```")
        {
            return inner.trim();
        }
    }
    trimmed
}
