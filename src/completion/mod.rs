//! Completion port — the external text-completion call tasks use to produce
//! candidate content.
//!
//! The core only needs the [`CompletionPort`] trait; [`HttpCompletionPort`]
//! is the one concrete implementation, speaking the OpenAI-compatible
//! chat-completions protocol.

pub mod http;

pub use http::HttpCompletionPort;

use std::time::Duration;

use async_trait::async_trait;

use crate::conversation::{Conversation, Turn};
use crate::error::CompletionError;

/// Per-call options for the completion service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    /// Sampling temperature; structured extraction wants this low.
    pub temperature: Option<f32>,
    /// Cap on generated units.
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Units consumed by one completion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_units: u64,
    pub completion_units: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.prompt_units + self.completion_units
    }
}

/// Result of one completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The service's response turn (always an assistant turn).
    pub turn: Turn,
    /// Units consumed.
    pub usage: Usage,
    /// Wall-clock duration of the call.
    pub duration: Duration,
}

/// Async boundary to the external text-completion service.
///
/// Transport and service failures surface as [`CompletionError`]; callers
/// must not retry those here — content-shape retries are the enrichment
/// wrapper's concern.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(
        &self,
        conversation: &Conversation,
        options: &CompletionOptions,
    ) -> Result<Completion, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builder() {
        let options = CompletionOptions::new()
            .with_temperature(0.1)
            .with_max_tokens(256);
        assert_eq!(options.temperature, Some(0.1));
        assert_eq!(options.max_tokens, Some(256));

        let defaults = CompletionOptions::new();
        assert_eq!(defaults.temperature, None);
        assert_eq!(defaults.max_tokens, None);
    }

    #[test]
    fn usage_total() {
        let usage = Usage {
            prompt_units: 120,
            completion_units: 34,
        };
        assert_eq!(usage.total(), 154);
    }
}
