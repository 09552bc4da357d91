//! Tools over the prompt hub.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{clamped_limit, optional_bool, required_str};
use super::spec::{ToolContext, ToolError, ToolResult, ToolSpec};

// === list_prompts ===

pub struct ListPromptsTool;

#[async_trait]
impl ToolSpec for ListPromptsTool {
    fn name(&self) -> &'static str {
        "list_prompts"
    }

    fn description(&self) -> &'static str {
        "Fetch prompts from LangSmith with optional filtering. is_public selects public \
         ('true') or private ('false', default) prompts."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "is_public": { "type": ["boolean", "string"], "default": "false" },
                "limit": { "type": "integer", "default": 20 }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let is_public = optional_bool(&input, "is_public")?.unwrap_or(false);
        let limit = clamped_limit(&input, "limit", 20, 100)?;
        let prompts = context.client.list_prompts(is_public, limit).await?;
        Ok(ToolResult::json(json!({
            "prompts": prompts,
            "total_count": prompts.len(),
        })))
    }
}

// === get_prompt_by_name ===

pub struct GetPromptByNameTool;

#[async_trait]
impl ToolSpec for GetPromptByNameTool {
    fn name(&self) -> &'static str {
        "get_prompt_by_name"
    }

    fn description(&self) -> &'static str {
        "Get a specific prompt by its exact name. Unqualified names resolve against \
         the current workspace; use 'owner/name' for shared prompts."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt_name": { "type": "string" }
            },
            "required": ["prompt_name"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let prompt_name = required_str(&input, "prompt_name")?;
        let prompt = context.client.get_prompt(prompt_name).await?;
        Ok(ToolResult::json(prompt))
    }
}
