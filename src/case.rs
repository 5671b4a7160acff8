//! Request keys arrive camelCase from the front-end (`dueDate`); columns are snake_case.

use serde_json::{Map, Value};

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "dueDate" -> "due_date", "createdAt" -> "created_at"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert all keys of a JSON object from camelCase to snake_case.
/// If both spellings are present the snake_case one wins.
pub fn object_keys_to_snake_case(obj: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    let mut converted = Vec::new();
    for (k, v) in obj {
        let snake = to_snake_case(&k);
        if snake == k {
            out.insert(k, v);
        } else {
            converted.push((snake, v));
        }
    }
    for (k, v) in converted {
        out.entry(k).or_insert(v);
    }
    out
}
