//! Core tool abstractions: the [`ToolSpec`] trait, shared context, results,
//! and the error taxonomy tools report through.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ClientError, LangSmithClient};

// === Errors ===

/// Errors a tool can surface to the protocol layer. The server renders these
/// as an `isError` tool result, never as a JSON-RPC failure.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("missing required argument: {field}")]
    MissingField { field: String },
    #[error(transparent)]
    Api(#[from] ClientError),
}

impl ToolError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

// === Context ===

/// Shared state handed to every tool invocation. Passed explicitly so a
/// tool's dependencies are visible in its signature.
#[derive(Clone)]
pub struct ToolContext {
    pub client: LangSmithClient,
}

impl ToolContext {
    pub fn new(client: LangSmithClient) -> Self {
        Self { client }
    }
}

// === Results ===

/// Output of a successful tool call: either a JSON document or plain text.
#[derive(Debug, Clone)]
pub enum ToolResult {
    Json(Value),
    Text(String),
}

impl ToolResult {
    pub fn json(value: Value) -> Self {
        Self::Json(value)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Render the result as the text body of an MCP content block.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Json(value) => crate::formatters::pretty_json(value),
            Self::Text(text) => text.clone(),
        }
    }
}

// === ToolSpec ===

/// A single MCP tool: name, self-describing schema, and an async execute.
#[async_trait]
pub trait ToolSpec: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's arguments.
    fn input_schema(&self) -> Value;

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError>;
}
