//! Argument extraction helpers shared by all tools.
//!
//! Tool arguments arrive as loosely typed JSON from MCP clients, and many
//! agent frontends send every parameter as a string. These helpers normalize
//! the common cases: the literal strings `"null"` and `""` are treated as
//! absent, booleans accept `"true"`/`"false"` strings, and list parameters
//! accept either a JSON array or a JSON-array-encoded string.

use serde_json::Value;

use super::spec::ToolError;

/// Fetch a required string argument.
pub fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    match input.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ToolError::missing_field(field)),
    }
}

/// Fetch an optional string argument, mapping `"null"` and `""` to `None`.
pub fn optional_str<'a>(input: &'a Value, field: &str) -> Option<&'a str> {
    match input.get(field)?.as_str() {
        Some("") | Some("null") => None,
        other => other,
    }
}

/// Fetch an optional integer, accepting both numbers and numeric strings.
pub fn optional_i64(input: &Value, field: &str) -> Result<Option<i64>, ToolError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            ToolError::invalid_input(format!("'{field}' must be an integer"))
        }),
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(None),
        Some(Value::String(s)) => s.parse::<i64>().map(Some).map_err(|_| {
            ToolError::invalid_input(format!("'{field}' must be an integer, got '{s}'"))
        }),
        Some(other) => Err(ToolError::invalid_input(format!(
            "'{field}' must be an integer, got: {other}"
        ))),
    }
}

/// Fetch an optional boolean, accepting both booleans and `"true"`/`"false"`.
pub fn optional_bool(input: &Value, field: &str) -> Result<Option<bool>, ToolError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => parse_bool_str(s, field),
        Some(other) => Err(ToolError::invalid_input(format!(
            "'{field}' must be a boolean, got: {other}"
        ))),
    }
}

fn parse_bool_str(s: &str, field: &str) -> Result<Option<bool>, ToolError> {
    match s.to_ascii_lowercase().as_str() {
        "" | "null" => Ok(None),
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => Err(ToolError::invalid_input(format!(
            "'{field}' must be 'true' or 'false', got '{s}'"
        ))),
    }
}

/// Fetch an optional list of strings. Accepts a JSON array of strings, a
/// JSON-array-encoded string (`"[\"a\", \"b\"]"`), or a single bare string.
pub fn optional_str_list(input: &Value, field: &str) -> Result<Vec<String>, ToolError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => collect_strings(items, field),
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(Vec::new()),
        Some(Value::String(s)) => {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
                collect_strings(&items, field)
            } else {
                Ok(vec![s.clone()])
            }
        }
        Some(other) => Err(ToolError::invalid_input(format!(
            "'{field}' must be a list of strings, got: {other}"
        ))),
    }
}

fn collect_strings(items: &[Value], field: &str) -> Result<Vec<String>, ToolError> {
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ToolError::invalid_input(format!("'{field}' must contain only strings"))
            })
        })
        .collect()
}

/// Fetch an optional JSON object. Accepts an object or a JSON-object-encoded
/// string.
pub fn optional_object(input: &Value, field: &str) -> Result<Option<Value>, ToolError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(obj @ Value::Object(_)) => Ok(Some(obj.clone())),
        Some(Value::String(s)) if s.is_empty() || s == "null" => Ok(None),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(obj @ Value::Object(_)) => Ok(Some(obj)),
            _ => Err(ToolError::invalid_input(format!(
                "'{field}' must be a JSON object, got '{s}'"
            ))),
        },
        Some(other) => Err(ToolError::invalid_input(format!(
            "'{field}' must be a JSON object, got: {other}"
        ))),
    }
}

/// Clamp a user-supplied limit to `[1, max]`, defaulting when absent.
pub fn clamped_limit(
    input: &Value,
    field: &str,
    default: usize,
    max: usize,
) -> Result<usize, ToolError> {
    match optional_i64(input, field)? {
        None => Ok(default.min(max)),
        Some(n) if n < 1 => Err(ToolError::invalid_input(format!(
            "'{field}' must be at least 1, got {n}"
        ))),
        Some(n) => Ok((n as usize).min(max)),
    }
}
