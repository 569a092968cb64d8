//! Message type — one unit of conversational data plus its annotation store.
//!
//! The annotation store is the only shared resource enrichment tasks mutate.
//! Each task owns the key(s) it writes; the store does not detect key
//! collisions (last write wins under concurrent writers).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One validated enrichment result, tagged with the units it cost to produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Decoded, validated content.
    pub content: Value,
    /// Total completion units reported by the call that produced it.
    pub cost: Option<u64>,
}

/// A message under enrichment.
#[derive(Debug)]
pub struct Message {
    /// Unique ID.
    pub id: Uuid,
    /// Raw message body.
    pub content: String,
    /// When the message entered the system.
    pub received_at: DateTime<Utc>,
    /// Key → annotation store, written by enrichment tasks.
    annotations: RwLock<HashMap<String, Annotation>>,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            received_at: Utc::now(),
            annotations: RwLock::new(HashMap::new()),
        }
    }

    /// Write an annotation under `key`, replacing any previous value.
    pub async fn set_annotation(&self, key: impl Into<String>, content: Value, cost: Option<u64>) {
        self.annotations
            .write()
            .await
            .insert(key.into(), Annotation { content, cost });
    }

    /// Read a single annotation.
    pub async fn annotation(&self, key: &str) -> Option<Annotation> {
        self.annotations.read().await.get(key).cloned()
    }

    /// Snapshot of the whole annotation store.
    pub async fn annotations(&self) -> HashMap<String, Annotation> {
        self.annotations.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_and_get_annotation() {
        let message = Message::new("hello world");
        message
            .set_annotation("keywords", json!(["hello", "world"]), Some(42))
            .await;

        let annotation = message.annotation("keywords").await.unwrap();
        assert_eq!(annotation.content, json!(["hello", "world"]));
        assert_eq!(annotation.cost, Some(42));
        assert!(message.annotation("summary").await.is_none());
    }

    #[tokio::test]
    async fn rewrite_replaces_previous_value() {
        let message = Message::new("hi");
        message.set_annotation("summary", json!("first"), None).await;
        message.set_annotation("summary", json!("second"), Some(7)).await;

        let annotation = message.annotation("summary").await.unwrap();
        assert_eq!(annotation.content, json!("second"));
        assert_eq!(annotation.cost, Some(7));
        assert_eq!(message.annotations().await.len(), 1);
    }
}
