use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONTENT_TYPE: &str = "application/json";

pub fn is_json_content(content: &str) -> bool {
    let trimmed = content.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

pub fn is_json_mime(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    mime.contains(CONTENT_TYPE) || mime.contains("+json")
}

/// Bounds on the JSON examples kept from captured bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExampleLimits {
    pub max_depth: usize,
    pub max_keys: usize,
    pub max_items: usize,
}

impl Default for ExampleLimits {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_keys: 10,
            max_items: 2,
        }
    }
}

/// Shrinks a value for use as documentation. Containers below `max_depth`
/// collapse to empty ones.
pub fn truncate_example(value: &Value, limits: &ExampleLimits) -> Value {
    truncate_at(value, limits, 0)
}

fn truncate_at(value: &Value, limits: &ExampleLimits, depth: usize) -> Value {
    match value {
        Value::Object(map) => {
            if depth >= limits.max_depth {
                return Value::Object(Map::new());
            }
            Value::Object(
                map.iter()
                    .take(limits.max_keys)
                    .map(|(k, v)| (k.clone(), truncate_at(v, limits, depth + 1)))
                    .collect(),
            )
        }
        Value::Array(items) => {
            if depth >= limits.max_depth {
                return Value::Array(Vec::new());
            }
            Value::Array(
                items
                    .iter()
                    .take(limits.max_items)
                    .map(|v| truncate_at(v, limits, depth + 1))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}
