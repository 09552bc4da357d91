//! Tools over org billing usage and workspaces.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::args::{optional_bool, optional_str, required_str};
use super::spec::{ToolContext, ToolError, ToolResult, ToolSpec};
use crate::client::LangSmithClient;

// === Workspace name resolution ===

fn workspace_name(workspace: &Value) -> Option<String> {
    for key in ["display_name", "name"] {
        if let Some(name) = workspace.get(key).and_then(Value::as_str)
            && !name.is_empty()
        {
            return Some(name.to_string());
        }
    }
    workspace
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn looks_like_uuid(s: &str) -> bool {
    s.chars().count() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}

/// The billing endpoint wants ISO 8601 bounds; reject anything else before
/// the round trip so the error names the bad argument.
fn check_iso_date(value: &str, field: &str) -> Result<(), ToolError> {
    let ok = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(value).is_ok();
    if ok {
        Ok(())
    } else {
        Err(ToolError::invalid_input(format!(
            "'{field}' must be an ISO 8601 date or timestamp, got '{value}'"
        )))
    }
}

/// Build a workspace id -> display name map. When `single` is set (a UUID or
/// a name), the map holds at most that one workspace.
async fn workspace_id_to_name(
    client: &LangSmithClient,
    single: Option<&str>,
) -> Result<BTreeMap<String, String>, ToolError> {
    let mut id_to_name = BTreeMap::new();

    if let Some(wanted) = single {
        let wanted = wanted.trim();
        if looks_like_uuid(wanted)
            && let Ok(workspace) = client.get_workspace(wanted).await
            && let Some(id) = workspace.get("id").and_then(Value::as_str)
        {
            let name = workspace_name(&workspace).unwrap_or_else(|| wanted.to_string());
            id_to_name.insert(id.to_string(), name);
            return Ok(id_to_name);
        }
        let wanted_lower = wanted.to_lowercase();
        for workspace in client.list_workspaces().await? {
            let Some(id) = workspace.get("id").and_then(Value::as_str) else {
                continue;
            };
            let name = workspace_name(&workspace).unwrap_or_else(|| id.to_string());
            if id == wanted || name.to_lowercase() == wanted_lower {
                id_to_name.insert(id.to_string(), name);
                return Ok(id_to_name);
            }
        }
        return Ok(id_to_name);
    }

    for workspace in client.list_workspaces().await? {
        if let Some(id) = workspace.get("id").and_then(Value::as_str) {
            let name = workspace_name(&workspace).unwrap_or_else(|| id.to_string());
            id_to_name.insert(id.to_string(), name);
        }
    }
    Ok(id_to_name)
}

/// Replace each metric's `groups` values with `{workspace_name, value}`
/// entries; when `only` is set, drop every other workspace's entry.
fn augment_groups(
    usage: Vec<Value>,
    id_to_name: &BTreeMap<String, String>,
    only: Option<&str>,
) -> Vec<Value> {
    usage
        .into_iter()
        .map(|mut item| {
            let Some(groups) = item.get("groups").and_then(Value::as_object).cloned() else {
                return item;
            };
            let mut new_groups = Map::new();
            for (uid, value) in groups {
                if let Some(only_id) = only
                    && uid != only_id
                {
                    continue;
                }
                let name = id_to_name.get(&uid).cloned().unwrap_or_else(|| uid.clone());
                new_groups.insert(uid, json!({"workspace_name": name, "value": value}));
            }
            item["groups"] = Value::Object(new_groups);
            item
        })
        .collect()
}

// === get_billing_usage ===

pub struct GetBillingUsageTool;

#[async_trait]
impl ToolSpec for GetBillingUsageTool {
    fn name(&self) -> &'static str {
        "get_billing_usage"
    }

    fn description(&self) -> &'static str {
        "Fetch org billing usage (trace counts) for a date range, with workspace names \
         resolved inline. Optionally filter to a single workspace by UUID or name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "starting_on": { "description": "Start of range (ISO 8601)", "type": "string" },
                "ending_before": { "description": "End of range (ISO 8601)", "type": "string" },
                "on_current_plan": { "type": ["boolean", "string"], "default": true },
                "workspace": { "description": "Workspace UUID or name to filter to", "type": "string" }
            },
            "required": ["starting_on", "ending_before"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let starting_on = required_str(&input, "starting_on")?;
        let ending_before = required_str(&input, "ending_before")?;
        check_iso_date(starting_on, "starting_on")?;
        check_iso_date(ending_before, "ending_before")?;
        let on_current_plan = optional_bool(&input, "on_current_plan")?.unwrap_or(true);
        let workspace = optional_str(&input, "workspace");

        let usage = context
            .client
            .billing_usage(starting_on, ending_before, on_current_plan)
            .await?;
        if usage.is_empty() {
            return Err(ToolError::invalid_input(
                "unexpected billing usage response",
            ));
        }

        let id_to_name = workspace_id_to_name(&context.client, workspace).await?;
        let only = if workspace.is_some() {
            id_to_name.keys().next().cloned()
        } else {
            None
        };
        let usage = augment_groups(usage, &id_to_name, only.as_deref());
        Ok(ToolResult::json(json!({ "usage": usage })))
    }
}

// === list_workspaces ===

pub struct ListWorkspacesTool;

#[async_trait]
impl ToolSpec for ListWorkspacesTool {
    fn name(&self) -> &'static str {
        "list_workspaces"
    }

    fn description(&self) -> &'static str {
        "List the workspaces visible to the current API key."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let workspaces = context.client.list_workspaces().await?;
        Ok(ToolResult::json(json!({ "workspaces": workspaces })))
    }
}
