//! Tools over datasets and their examples.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{
    clamped_limit, optional_bool, optional_i64, optional_object, optional_str,
    optional_str_list, required_str,
};
use super::spec::{ToolContext, ToolError, ToolResult, ToolSpec};
use crate::client::{DatasetQuery, ExampleQuery};

// === list_datasets ===

pub struct ListDatasetsTool;

#[async_trait]
impl ToolSpec for ListDatasetsTool {
    fn name(&self) -> &'static str {
        "list_datasets"
    }

    fn description(&self) -> &'static str {
        "Fetch LangSmith datasets. With no arguments, all datasets are returned."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dataset_ids": {
                    "description": "Dataset IDs as a JSON array string (e.g. '[\"id1\", \"id2\"]') or a single ID",
                    "type": ["string", "array"]
                },
                "data_type": { "description": "Filter by data type (e.g. 'chat', 'kv')", "type": "string" },
                "dataset_name": { "description": "Filter by exact dataset name", "type": "string" },
                "dataset_name_contains": { "description": "Filter by substring in dataset name", "type": "string" },
                "metadata": { "description": "Filter by metadata, as an object or JSON-encoded string", "type": ["object", "string"] },
                "limit": { "type": "integer", "default": 20 }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let query = DatasetQuery {
            dataset_ids: optional_str_list(&input, "dataset_ids")?,
            data_type: optional_str(&input, "data_type").map(str::to_string),
            name: optional_str(&input, "dataset_name").map(str::to_string),
            name_contains: optional_str(&input, "dataset_name_contains").map(str::to_string),
            metadata: optional_object(&input, "metadata")?,
            limit: clamped_limit(&input, "limit", 20, 100)?,
        };
        let datasets = context.client.list_datasets(&query).await?;
        Ok(ToolResult::json(json!({ "datasets": datasets })))
    }
}

// === list_examples ===

pub struct ListExamplesTool;

#[async_trait]
impl ToolSpec for ListExamplesTool {
    fn name(&self) -> &'static str {
        "list_examples"
    }

    fn description(&self) -> &'static str {
        "Fetch examples from a LangSmith dataset. Either dataset_id, dataset_name, or \
         example_ids must be provided; precedence is example_ids, dataset_id, dataset_name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dataset_id": { "type": "string" },
                "dataset_name": { "type": "string" },
                "example_ids": {
                    "description": "Example IDs as a JSON array string or a single ID",
                    "type": ["string", "array"]
                },
                "filter": { "description": "Query language filter expression", "type": "string" },
                "metadata": { "type": ["object", "string"] },
                "splits": {
                    "description": "Dataset splits as a JSON array string (e.g. '[\"train\", \"test\"]') or a single split",
                    "type": ["string", "array"]
                },
                "inline_s3_urls": { "type": ["boolean", "string"] },
                "include_attachments": { "type": ["boolean", "string"] },
                "as_of": { "description": "Dataset version tag OR ISO timestamp", "type": "string" },
                "limit": { "type": "integer", "default": 10 },
                "offset": { "type": "integer", "default": 0 }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let example_ids = optional_str_list(&input, "example_ids")?;
        let dataset_id = optional_str(&input, "dataset_id").map(str::to_string);
        let dataset_name = optional_str(&input, "dataset_name");
        if example_ids.is_empty() && dataset_id.is_none() && dataset_name.is_none() {
            return Err(ToolError::invalid_input(
                "either dataset_id, dataset_name, or example_ids must be provided",
            ));
        }

        // Precedence: example_ids, then dataset_id, then dataset_name.
        let dataset_id = if !example_ids.is_empty() {
            None
        } else if dataset_id.is_some() {
            dataset_id
        } else if let Some(name) = dataset_name {
            let dataset = context.client.read_dataset_by_name(name).await?;
            dataset.get("id").and_then(Value::as_str).map(str::to_string)
        } else {
            None
        };

        let offset = match optional_i64(&input, "offset")? {
            None => None,
            Some(n) if n < 0 => {
                return Err(ToolError::invalid_input("'offset' must be >= 0"));
            }
            Some(n) => Some(n as usize),
        };
        let query = ExampleQuery {
            dataset_id,
            example_ids,
            filter: optional_str(&input, "filter").map(str::to_string),
            metadata: optional_object(&input, "metadata")?,
            splits: optional_str_list(&input, "splits")?,
            inline_s3_urls: optional_bool(&input, "inline_s3_urls")?,
            include_attachments: optional_bool(&input, "include_attachments")?,
            as_of: optional_str(&input, "as_of").map(str::to_string),
            offset,
            limit: clamped_limit(&input, "limit", 10, 100)?,
        };
        let examples = context.client.list_examples(&query).await?;
        Ok(ToolResult::json(json!({ "examples": examples })))
    }
}

// === read_dataset ===

pub struct ReadDatasetTool;

#[async_trait]
impl ToolSpec for ReadDatasetTool {
    fn name(&self) -> &'static str {
        "read_dataset"
    }

    fn description(&self) -> &'static str {
        "Read a specific dataset. Either dataset_id or dataset_name must be provided; \
         dataset_id takes precedence."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dataset_id": { "type": "string" },
                "dataset_name": { "type": "string" }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let dataset = match (
            optional_str(&input, "dataset_id"),
            optional_str(&input, "dataset_name"),
        ) {
            (Some(id), _) => context.client.read_dataset_by_id(id).await?,
            (None, Some(name)) => context.client.read_dataset_by_name(name).await?,
            (None, None) => {
                return Err(ToolError::invalid_input(
                    "either dataset_id or dataset_name must be provided",
                ));
            }
        };
        Ok(ToolResult::json(dataset))
    }
}

// === read_example ===

pub struct ReadExampleTool;

#[async_trait]
impl ToolSpec for ReadExampleTool {
    fn name(&self) -> &'static str {
        "read_example"
    }

    fn description(&self) -> &'static str {
        "Read a specific dataset example, optionally as of a dataset version tag or \
         ISO timestamp."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "example_id": { "type": "string" },
                "as_of": { "type": "string" }
            },
            "required": ["example_id"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let example_id = required_str(&input, "example_id")?;
        let example = context
            .client
            .read_example(example_id, optional_str(&input, "as_of"))
            .await?;
        Ok(ToolResult::json(example))
    }
}
