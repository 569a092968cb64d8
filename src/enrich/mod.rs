//! Enrichment layer — retry-validating extraction tasks and their schemas.
//!
//! Flow per task:
//! 1. Build a private scoped conversation (system instruction + message).
//! 2. Call the completion port.
//! 3. Decode as JSON, validate against the task's schema.
//! 4. On a content-shape failure, feed the reason back and retry (bounded).
//! 5. On success, write the validated value to the message's annotations.

pub mod prompts;
pub mod task;
pub mod validate;

pub use task::{DEFAULT_MAX_TRIES, RetryValidatingTask};
pub use validate::{ENTITY_CATEGORIES, EntityList, KeywordList, SummaryText, Validator};

use std::sync::Arc;

use crate::completion::{CompletionOptions, CompletionPort};
use crate::config::EnrichConfig;
use crate::graph::Task;

/// Build the standard enrichment set: summary, keywords, entities.
///
/// The three extractions are independent, so the graph may run them fully
/// concurrently.
pub fn standard_tasks(port: &Arc<dyn CompletionPort>, config: &EnrichConfig) -> Vec<Task> {
    let options = CompletionOptions::new()
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    let set: [(&str, String, Arc<dyn Validator>); 3] = [
        ("summary", prompts::summary_instruction(), Arc::new(SummaryText)),
        ("keywords", prompts::keywords_instruction(), Arc::new(KeywordList)),
        ("entities", prompts::entities_instruction(), Arc::new(EntityList)),
    ];

    set.into_iter()
        .map(|(key, instruction, validator)| {
            RetryValidatingTask::new(key, Arc::clone(port), validator, instruction)
                .with_max_tries(config.max_tries)
                .with_options(options.clone())
                .into_task(vec![])
        })
        .collect()
}
