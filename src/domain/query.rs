//! Query extraction for the gateway's loosely-shaped request bodies

use serde_json::Value;

/// Body some MCP clients send when a prompt template was never filled in.
pub const UNFILLED_TEMPLATE: &str = "{{input}}";
pub const DEFAULT_QUERY: &str = "Hello, how can I help you?";
pub const QUERY_FIELDS: [&str; 4] = ["query", "message", "text", "content"];

pub fn extract_query(raw: &str) -> String {
    if raw == UNFILLED_TEMPLATE {
        return DEFAULT_QUERY.to_string();
    }

    let Ok(payload) = serde_json::from_str::<Value>(raw) else {
        return raw.to_string();
    };

    if let Some(object) = payload.as_object() {
        if let Some(value) = QUERY_FIELDS.iter().find_map(|field| object.get(*field)) {
            return value_text(value);
        }
    }

    value_text(&payload)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
