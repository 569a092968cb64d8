//! Schema validators for decoded enrichment output.
//!
//! A validator's rejection reason is fed back to the completion service
//! verbatim as a corrective turn, so reasons are written for the model:
//! concrete, one sentence, naming the offending element.

use serde_json::Value;

/// Checks a decoded completion value against the shape a task requires.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), String> {
        self(value)
    }
}

/// Non-empty array of keyword strings.
pub struct KeywordList;

impl Validator for KeywordList {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let items = value
            .as_array()
            .ok_or_else(|| "expected a JSON array of keyword strings".to_string())?;
        if items.is_empty() {
            return Err("the keyword array must not be empty".to_string());
        }
        for (i, item) in items.iter().enumerate() {
            if !item.is_string() {
                return Err(format!("keyword at index {i} is not a string"));
            }
        }
        Ok(())
    }
}

/// Categories an extracted entity may be tagged with.
pub const ENTITY_CATEGORIES: &[&str] = &[
    "person",
    "organization",
    "location",
    "product",
    "event",
    "other",
];

/// Array of `{name, category}` objects with an enumerated category.
///
/// An empty array is valid — a message may mention no entities at all.
pub struct EntityList;

impl Validator for EntityList {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let items = value
            .as_array()
            .ok_or_else(|| "expected a JSON array of entity objects".to_string())?;
        for (i, item) in items.iter().enumerate() {
            let entity = item
                .as_object()
                .ok_or_else(|| format!("entity at index {i} is not an object"))?;
            let name = entity
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("entity at index {i} is missing a string \"name\""))?;
            if name.trim().is_empty() {
                return Err(format!("entity at index {i} has an empty name"));
            }
            let category = entity
                .get("category")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("entity at index {i} is missing a string \"category\""))?;
            if !ENTITY_CATEGORIES.contains(&category) {
                return Err(format!(
                    "entity at index {i} has unknown category {category:?}; expected one of: {}",
                    ENTITY_CATEGORIES.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// A single non-empty JSON string.
pub struct SummaryText;

impl Validator for SummaryText {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = value
            .as_str()
            .ok_or_else(|| "expected a single JSON string".to_string())?;
        if text.trim().is_empty() {
            return Err("the summary must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyword_rejections_are_distinct() {
        let not_array = KeywordList.validate(&json!({"k": 1})).unwrap_err();
        let empty = KeywordList.validate(&json!([])).unwrap_err();
        let non_string = KeywordList.validate(&json!(["ok", 7])).unwrap_err();

        assert!(not_array.contains("array"));
        assert!(empty.contains("empty"));
        assert!(non_string.contains("index 1"));
        assert_ne!(not_array, empty);
        assert_ne!(empty, non_string);
        assert_ne!(not_array, non_string);
    }

    #[test]
    fn keyword_list_accepts_strings() {
        assert!(KeywordList.validate(&json!(["rust", "tasks"])).is_ok());
    }

    #[test]
    fn entity_list_accepts_known_categories() {
        let value = json!([
            {"name": "Ada Lovelace", "category": "person"},
            {"name": "London", "category": "location"}
        ]);
        assert!(EntityList.validate(&value).is_ok());
        assert!(EntityList.validate(&json!([])).is_ok());
    }

    #[test]
    fn entity_list_rejects_bad_shapes() {
        assert!(EntityList.validate(&json!("nope")).unwrap_err().contains("array"));
        assert!(
            EntityList
                .validate(&json!(["string instead of object"]))
                .unwrap_err()
                .contains("not an object")
        );
        assert!(
            EntityList
                .validate(&json!([{"category": "person"}]))
                .unwrap_err()
                .contains("name")
        );
        assert!(
            EntityList
                .validate(&json!([{"name": "  ", "category": "person"}]))
                .unwrap_err()
                .contains("empty name")
        );
        let unknown = EntityList
            .validate(&json!([{"name": "X", "category": "animal"}]))
            .unwrap_err();
        assert!(unknown.contains("animal"));
        assert!(unknown.contains("person"));
    }

    #[test]
    fn summary_text_requires_non_empty_string() {
        assert!(SummaryText.validate(&json!("a fine summary")).is_ok());
        assert!(SummaryText.validate(&json!("")).unwrap_err().contains("empty"));
        assert!(SummaryText.validate(&json!(["list"])).unwrap_err().contains("string"));
    }

    #[test]
    fn closures_can_act_as_validators() {
        let validator = |value: &Value| -> Result<(), String> {
            value.as_bool().map(|_| ()).ok_or_else(|| "not a bool".into())
        };
        assert!(validator.validate(&json!(true)).is_ok());
        assert!(validator.validate(&json!(1)).is_err());
    }
}
