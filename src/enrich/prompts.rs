//! System instructions for the standard enrichment tasks.
//!
//! Each instruction pins the exact output shape the matching validator
//! checks, so a well-behaved model passes on the first attempt.

use crate::enrich::validate::ENTITY_CATEGORIES;

/// Instruction for the summary extraction.
pub fn summary_instruction() -> String {
    "You summarize messages. \
     Respond with a single JSON string containing a one-sentence summary of \
     the user's message. No markdown, no explanations — only the JSON string."
        .to_string()
}

/// Instruction for the keyword extraction.
pub fn keywords_instruction() -> String {
    "You extract keywords. \
     Respond with a JSON array of the most salient keywords in the user's \
     message, each a string, at least one entry. No markdown, no \
     explanations — only the JSON array."
        .to_string()
}

/// Instruction for the entity extraction.
pub fn entities_instruction() -> String {
    format!(
        "You extract named entities. \
         Respond with a JSON array of objects, each with a \"name\" string \
         and a \"category\" string. The category must be one of: {}. \
         Use an empty array when the message mentions no entities. \
         No markdown, no explanations — only the JSON array.",
        ENTITY_CATEGORIES.join(", ")
    )
}
