//! MCP server over stdio: newline-delimited JSON-RPC 2.0.
//!
//! One request per line on stdin, one response per line on stdout. Blank and
//! non-JSON lines are skipped, notifications (no `id`) are consumed without a
//! response, and tool failures are reported as `isError` tool results rather
//! than JSON-RPC errors so clients can surface them to the model.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::tools::{ToolContext, ToolRegistry};

const JSONRPC_VERSION: &str = "2.0";
const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

pub struct McpServer {
    registry: ToolRegistry,
    context: ToolContext,
}

impl McpServer {
    #[must_use]
    pub fn new(registry: ToolRegistry, context: ToolContext) -> Self {
        Self { registry, context }
    }

    /// Serve requests from stdin until EOF.
    pub async fn run_stdio(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!(tools = self.registry.len(), "serving MCP over stdio");

        while let Some(line) = lines.next_line().await.context("reading stdin")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(message) = serde_json::from_str::<Value>(line) else {
                tracing::warn!("skipping non-JSON input line");
                continue;
            };
            if let Some(response) = self.handle_message(message).await {
                let mut payload =
                    serde_json::to_vec(&response).context("encoding response")?;
                payload.push(b'\n');
                stdout.write_all(&payload).await.context("writing stdout")?;
                stdout.flush().await.context("flushing stdout")?;
            }
        }
        Ok(())
    }

    /// Handle a single JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let id = message.get("id").cloned();
        let method = message.get("method").and_then(Value::as_str)?;
        // Notifications carry no id and get no response.
        let id = id?;
        let params = message.get("params").cloned().unwrap_or(json!({}));

        tracing::debug!(method, "handling request");
        let response = match method {
            "initialize" => Ok(self.initialize_result(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.definitions() })),
            "tools/call" => self.call_tool(&params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            other => Err((
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        };

        Some(match response {
            Ok(result) => json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": id,
                "result": result,
            }),
            Err((code, message)) => json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": id,
                "error": { "code": code, "message": message },
            }),
        })
    }

    fn initialize_result(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": "langsmith-mcp",
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, (i64, String)> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or((INVALID_PARAMS, "missing tool name".to_string()))?;
        let Some(tool) = self.registry.get(name) else {
            return Err((INVALID_PARAMS, format!("unknown tool: {name}")));
        };
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        match tool.execute(arguments, &self.context).await {
            Ok(result) => Ok(tool_content(&result.render(), false)),
            Err(error) => {
                tracing::warn!(tool = name, %error, "tool call failed");
                Ok(tool_content(&format!("Error: {error}"), true))
            }
        }
    }
}

fn tool_content(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::client::LangSmithClient;
    use crate::config::Config;
    use crate::tools::default_registry;

    fn server() -> McpServer {
        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        let client = LangSmithClient::new(&config).unwrap();
        McpServer::new(default_registry(), ToolContext::new(client))
    }

    #[tokio::test]
    async fn initialize_echoes_protocol_version() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {"protocolVersion": "2025-03-26"}
            }))
            .await
            .unwrap();
        assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(response["result"]["serverInfo"]["name"], "langsmith-mcp");
    }

    #[tokio::test]
    async fn initialize_defaults_protocol_version() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0", "id": 1, "method": "initialize"
            }))
            .await
            .unwrap();
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn tools_list_returns_all_definitions() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/list"
            }))
            .await
            .unwrap();
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 14);
    }

    #[tokio::test]
    async fn unknown_method_is_rpc_error() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0", "id": 3, "method": "bogus/method"
            }))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0",
                "method": "notifications/initialized"
            }))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn tool_input_errors_are_is_error_results() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "read_example", "arguments": {}}
            }))
            .await
            .unwrap();
        let result = &response["result"];
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("example_id"));
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let response = server()
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "no_such_tool"}
            }))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn ping_returns_empty_result() {
        let response = server()
            .handle_message(json!({"jsonrpc": "2.0", "id": 6, "method": "ping"}))
            .await
            .unwrap();
        assert_eq!(response["result"], json!({}));
    }
}
