//! Message extraction and output formatting for run payloads.
//!
//! Run inputs/outputs are arbitrary nested JSON; chat messages can live at
//! several well-known spots (`messages` lists, a single `message`,
//! OpenAI-style `choices[i].message`). These walks are bounded-depth and
//! never mutate their input.

use serde_json::Value;
use std::collections::HashSet;

/// Maximum recursion depth when hunting for messages in nested payloads.
const MAX_EXTRACT_DEPTH: usize = 5;

/// Recursively extract message objects from a nested structure.
///
/// A `messages` array is the highest-priority match: its object entries are
/// collected and the walk stops at that node. Otherwise a single `message`
/// object and OpenAI-style `choices[i].message` entries are picked up; only
/// if nothing matched at this level does the walk descend further.
fn extract_messages(data: &Value, depth: usize) -> Vec<Value> {
    if depth > MAX_EXTRACT_DEPTH {
        return Vec::new();
    }

    let mut messages = Vec::new();

    match data {
        Value::Object(map) => {
            if let Some(Value::Array(msgs)) = map.get("messages") {
                for msg in msgs {
                    if msg.is_object() {
                        messages.push(msg.clone());
                    }
                }
                return messages;
            }

            if let Some(msg) = map.get("message")
                && msg.is_object()
            {
                messages.push(msg.clone());
            }

            if let Some(Value::Array(choices)) = map.get("choices") {
                for choice in choices {
                    if let Some(msg) = choice.get("message")
                        && msg.is_object()
                    {
                        messages.push(msg.clone());
                    }
                }
            }

            if !messages.is_empty() {
                return messages;
            }

            for value in map.values() {
                if value.is_object() || value.is_array() {
                    messages.extend(extract_messages(value, depth + 1));
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if item.is_object() || item.is_array() {
                    messages.extend(extract_messages(item, depth + 1));
                }
            }
        }
        _ => {}
    }

    messages
}

/// Extract chat messages from a run object, scanning `inputs` then
/// `outputs`, deduplicating by message `id` when present.
#[must_use]
pub fn extract_messages_from_run(run: &Value) -> Vec<Value> {
    let mut messages = Vec::new();
    if let Some(inputs) = run.get("inputs")
        && !inputs.is_null()
    {
        messages.extend(extract_messages(inputs, 0));
    }
    if let Some(outputs) = run.get("outputs")
        && !outputs.is_null()
    {
        messages.extend(extract_messages(outputs, 0));
    }

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut deduped = Vec::with_capacity(messages.len());
    for msg in messages {
        if let Some(id) = msg.get("id").and_then(Value::as_str) {
            if !seen_ids.insert(id.to_string()) {
                continue;
            }
        }
        deduped.push(msg);
    }
    deduped
}

/// Render messages as pretty-printed JSON.
#[must_use]
pub fn format_messages(messages: &[Value]) -> String {
    serde_json::to_string_pretty(&messages).unwrap_or_else(|_| Value::Array(messages.to_vec()).to_string())
}

/// Pretty-print a JSON value, falling back to compact output if the pretty
/// serializer fails.
#[must_use]
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Depth-first search for the first occurrence of `key` anywhere in a nested
/// structure. Used to surface fields like `deployment_id` from project
/// payloads without assuming where the API nests them.
#[must_use]
pub fn find_in_dict<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    match data {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_in_dict(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_in_dict(v, key)),
        _ => None,
    }
}
