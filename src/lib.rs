//! Message enrichment core — dependency-scheduled tasks over an unreliable
//! text-completion service.

pub mod completion;
pub mod config;
pub mod conversation;
pub mod enrich;
pub mod error;
pub mod graph;
pub mod message;
