//! HTTP completion port against an OpenAI-compatible chat-completions endpoint.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::completion::{Completion, CompletionOptions, CompletionPort, Usage};
use crate::conversation::{Conversation, Turn};
use crate::error::CompletionError;

/// Completion port backed by an OpenAI-compatible `/chat/completions` API.
pub struct HttpCompletionPort {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl HttpCompletionPort {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, model: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    fn build_request<'a>(
        &'a self,
        conversation: &'a Conversation,
        options: &CompletionOptions,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: conversation
                .turns()
                .iter()
                .map(|turn| WireMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionPort for HttpCompletionPort {
    async fn complete(
        &self,
        conversation: &Conversation,
        options: &CompletionOptions,
    ) -> Result<Completion, CompletionError> {
        let request = self.build_request(conversation, options);
        let url = format!("{}/chat/completions", self.base_url);

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Request(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    CompletionError::Request(format!("connection failed: {e}"))
                } else {
                    CompletionError::Request(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let duration = started.elapsed();

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::InvalidResponse(format!("{e}, body: {body}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::InvalidResponse("no choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| CompletionError::InvalidResponse("choice has no content".to_string()))?;

        let usage = parsed
            .usage
            .map(|u| Usage {
                prompt_units: u.prompt_tokens,
                completion_units: u.completion_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            model = %self.model,
            units = usage.total(),
            elapsed_ms = duration.as_millis() as u64,
            "completion call finished"
        );

        Ok(Completion {
            turn: Turn::assistant(content),
            usage,
            duration,
        })
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
