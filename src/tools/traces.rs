//! Tools over runs, traces, and conversation threads.

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::args::{
    clamped_limit, optional_bool, optional_str, optional_str_list, required_str,
};
use super::spec::{ToolContext, ToolError, ToolResult, ToolSpec};
use crate::client::{LIST_RUNS_MAX_LIMIT, RunQuery};
use crate::formatters::{extract_messages_from_run, find_in_dict};
use crate::pagination::{
    DEFAULT_MAX_CHARS_PER_PAGE, DEFAULT_PREVIEW_CHARS, MAX_CHARS_PER_PAGE, MAX_RUNS_PER_TRACE,
    PaginateOptions, paginate,
};

// === Shared helpers ===

/// Resolve `project_name` (a single name or a list) into session ids.
async fn resolve_sessions(
    context: &ToolContext,
    input: &Value,
) -> Result<Vec<String>, ToolError> {
    let names = optional_str_list(input, "project_name")?;
    let mut sessions = Vec::with_capacity(names.len());
    for name in &names {
        sessions.push(context.client.resolve_project_id(name).await?);
    }
    Ok(sessions)
}

fn pagination_args(input: &Value) -> Result<(i64, usize, usize), ToolError> {
    let page_number = super::args::optional_i64(input, "page_number")?.unwrap_or(1);
    let max_chars = clamped_limit(
        input,
        "max_chars_per_page",
        DEFAULT_MAX_CHARS_PER_PAGE,
        MAX_CHARS_PER_PAGE,
    )?;
    let preview_chars = match super::args::optional_i64(input, "preview_chars")? {
        None => DEFAULT_PREVIEW_CHARS,
        Some(n) if n < 0 => {
            return Err(ToolError::invalid_input("'preview_chars' must be >= 0"));
        }
        Some(n) => n as usize,
    };
    Ok((page_number, max_chars, preview_chars))
}

// === fetch_runs ===

pub struct FetchRunsTool;

#[async_trait]
impl ToolSpec for FetchRunsTool {
    fn name(&self) -> &'static str {
        "fetch_runs"
    }

    fn description(&self) -> &'static str {
        "Fetch LangSmith runs (traces, tools, chains, etc.) from one or more projects \
         using flexible filters, query language expressions, and trace-level constraints."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_name": {
                    "description": "Project name, or a JSON list of project names",
                    "type": ["string", "array"]
                },
                "trace_id": { "type": "string" },
                "run_type": { "type": "string" },
                "error": { "type": ["boolean", "string"] },
                "is_root": { "type": ["boolean", "string"] },
                "filter": { "type": "string" },
                "trace_filter": { "type": "string" },
                "tree_filter": { "type": "string" },
                "order_by": { "type": "string", "default": "-start_time" },
                "limit": { "type": "integer", "default": 50, "maximum": 100 },
                "reference_example_id": { "type": "string" }
            },
            "required": ["project_name"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let query = build_run_query(&input, context).await?;
        let runs = context.client.list_runs(&query).await?;
        Ok(ToolResult::json(json!({ "runs": runs })))
    }
}

async fn build_run_query(input: &Value, context: &ToolContext) -> Result<RunQuery, ToolError> {
    let sessions = resolve_sessions(context, input).await?;
    if sessions.is_empty() && optional_str(input, "trace_id").is_none() {
        return Err(ToolError::invalid_input(
            "either project_name or trace_id must be provided",
        ));
    }
    Ok(RunQuery {
        session: sessions,
        trace: optional_str(input, "trace_id").map(str::to_string),
        run_type: optional_str(input, "run_type").map(str::to_string),
        error: optional_bool(input, "error")?,
        is_root: optional_bool(input, "is_root")?,
        filter: optional_str(input, "filter").map(str::to_string),
        trace_filter: optional_str(input, "trace_filter").map(str::to_string),
        tree_filter: optional_str(input, "tree_filter").map(str::to_string),
        order: Some(
            optional_str(input, "order_by")
                .unwrap_or("-start_time")
                .to_string(),
        ),
        reference_example: optional_str(input, "reference_example_id").map(str::to_string),
        select: Vec::new(),
        limit: clamped_limit(input, "limit", 50, LIST_RUNS_MAX_LIMIT)?,
    })
}

// === fetch_runs_paginated ===

pub struct FetchRunsPaginatedTool;

#[async_trait]
impl ToolSpec for FetchRunsPaginatedTool {
    fn name(&self) -> &'static str {
        "fetch_runs_paginated"
    }

    fn description(&self) -> &'static str {
        "Fetch one page of runs for a single trace (char-based pagination, stateless). \
         Pages are built by character budget over compact JSON; long strings are \
         truncated to preview_chars. Use page_number and total_pages to iterate."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_name": { "type": ["string", "array"] },
                "trace_id": { "type": "string" },
                "page_number": { "type": "integer", "default": 1 },
                "max_chars_per_page": { "type": "integer", "default": 25000, "maximum": 30000 },
                "preview_chars": { "type": "integer", "default": 150 },
                "limit": { "type": "integer", "maximum": 100 }
            },
            "required": ["project_name", "trace_id"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let trace_id = required_str(&input, "trace_id")?;
        let (page_number, max_chars, preview_chars) = pagination_args(&input)?;
        let run_limit = clamped_limit(&input, "limit", MAX_RUNS_PER_TRACE, MAX_RUNS_PER_TRACE)?;

        let query = RunQuery {
            session: resolve_sessions(context, &input).await?,
            trace: Some(trace_id.to_string()),
            order: Some("-start_time".to_string()),
            limit: run_limit,
            ..RunQuery::default()
        };
        let runs = context.client.list_runs(&query).await?;

        Ok(ToolResult::json(paginate(
            &runs,
            page_number,
            max_chars,
            preview_chars,
            &PaginateOptions::default(),
        )))
    }
}

// === fetch_trace ===

const TRACE_SELECT_FIELDS: &[&str] = &[
    "inputs",
    "outputs",
    "run_type",
    "id",
    "error",
    "total_tokens",
    "total_cost",
    "feedback_stats",
    "app_path",
    "thread_id",
];

pub struct FetchTraceTool;

#[async_trait]
impl ToolSpec for FetchTraceTool {
    fn name(&self) -> &'static str {
        "fetch_trace"
    }

    fn description(&self) -> &'static str {
        "Fetch the root run of a trace, by trace ID or by project name (latest trace). \
         Only one of the parameters is required; trace_id wins if both are provided."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_name": { "type": "string" },
                "trace_id": { "type": "string" }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let project_name = optional_str(&input, "project_name");
        let trace_id = optional_str(&input, "trace_id");
        if project_name.is_none() && trace_id.is_none() {
            return Err(ToolError::invalid_input(
                "either project_name or trace_id must be provided",
            ));
        }

        // trace_id wins; only fall back to project scoping without one.
        let session = match project_name {
            Some(name) if trace_id.is_none() => {
                vec![context.client.resolve_project_id(name).await?]
            }
            _ => Vec::new(),
        };
        let query = RunQuery {
            session,
            trace: trace_id.map(str::to_string),
            is_root: Some(true),
            select: TRACE_SELECT_FIELDS.iter().map(|s| s.to_string()).collect(),
            limit: 1,
            ..RunQuery::default()
        };
        let runs = context.client.list_runs(&query).await?;
        let Some(run) = runs.first() else {
            let scope = trace_id
                .map(|t| format!("trace_id: {t}"))
                .or_else(|| project_name.map(|p| format!("project_name: {p}")))
                .unwrap_or_default();
            return Err(ToolError::invalid_input(format!("no runs found for {scope}")));
        };

        let mut out = Map::new();
        out.insert("trace_id".to_string(), run["id"].clone());
        for field in TRACE_SELECT_FIELDS {
            out.insert((*field).to_string(), run.get(*field).cloned().unwrap_or(Value::Null));
        }
        Ok(ToolResult::json(Value::Object(out)))
    }
}

// === get_thread_history ===

pub struct GetThreadHistoryTool;

#[async_trait]
impl ToolSpec for GetThreadHistoryTool {
    fn name(&self) -> &'static str {
        "get_thread_history"
    }

    fn description(&self) -> &'static str {
        "Get one page of message history for a thread (char-based pagination). \
         Fetches LLM runs for the thread, sorts chronologically, flattens their \
         messages, and paginates by character budget."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "thread_id": { "type": "string" },
                "project_name": { "type": "string" },
                "page_number": { "type": "integer", "default": 1 },
                "max_chars_per_page": { "type": "integer", "default": 25000, "maximum": 30000 },
                "preview_chars": { "type": "integer", "default": 150 }
            },
            "required": ["thread_id", "project_name"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let thread_id = required_str(&input, "thread_id")?;
        let project_name = required_str(&input, "project_name")?;
        let (page_number, max_chars, preview_chars) = pagination_args(&input)?;

        // Threads are identified by any of these metadata keys.
        let filter = format!(
            "and(in(metadata_key, [\"session_id\",\"conversation_id\",\"thread_id\"]), \
             eq(metadata_value, \"{thread_id}\"))"
        );
        let query = RunQuery {
            session: vec![context.client.resolve_project_id(project_name).await?],
            run_type: Some("llm".to_string()),
            filter: Some(filter),
            limit: LIST_RUNS_MAX_LIMIT,
            ..RunQuery::default()
        };
        let mut runs = context.client.list_runs(&query).await?;
        if runs.is_empty() {
            return Err(ToolError::invalid_input(format!(
                "no runs found for thread {thread_id} in project {project_name}"
            )));
        }

        // Chronological order (oldest first) for history.
        runs.sort_by(|a, b| {
            let key = |r: &Value| {
                r.get("start_time")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            key(a).cmp(&key(b))
        });

        let messages: Vec<Value> = runs.iter().flat_map(extract_messages_from_run).collect();
        if messages.is_empty() {
            return Err(ToolError::invalid_input(format!(
                "no messages found in the runs for thread {thread_id}"
            )));
        }

        Ok(ToolResult::json(paginate(
            &messages,
            page_number,
            max_chars,
            preview_chars,
            &PaginateOptions::messages(),
        )))
    }
}

// === get_project_runs_stats ===

pub struct GetProjectRunsStatsTool;

#[async_trait]
impl ToolSpec for GetProjectRunsStatsTool {
    fn name(&self) -> &'static str {
        "get_project_runs_stats"
    }

    fn description(&self) -> &'static str {
        "Get aggregate run statistics for a project or a single trace. \
         Only one of the parameters is required; trace_id wins if both are provided."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_name": { "type": "string" },
                "trace_id": { "type": "string" }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let project_name = optional_str(&input, "project_name");
        let trace_id = optional_str(&input, "trace_id");
        if project_name.is_none() && trace_id.is_none() {
            return Err(ToolError::invalid_input(
                "either project_name or trace_id must be provided",
            ));
        }

        // Qualified names ("owner/project") resolve by their project part.
        let actual_name = project_name.map(|name| match name.split_once('/') {
            Some((_, project)) => project,
            None => name,
        });
        let sessions = match actual_name {
            Some(name) => vec![context.client.resolve_project_id(name).await?],
            None => Vec::new(),
        };

        let mut stats = context.client.run_stats(&sessions, trace_id).await?;
        if let Some(map) = stats.as_object_mut() {
            map.remove("run_facets");
            map.insert(
                "project_name".to_string(),
                actual_name.map_or(Value::Null, |n| json!(n)),
            );
        }
        Ok(ToolResult::json(stats))
    }
}

// === list_projects ===

pub struct ListProjectsTool;

#[async_trait]
impl ToolSpec for ListProjectsTool {
    fn name(&self) -> &'static str {
        "list_projects"
    }

    fn description(&self) -> &'static str {
        "List tracing projects. By default returns a compact view (name, project_id, \
         agent_deployment_id when present); set more_info for full project records."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": { "type": "integer", "default": 5 },
                "project_name": { "description": "Filter projects by name substring", "type": "string" },
                "more_info": { "type": ["boolean", "string"], "default": false },
                "reference_dataset_id": { "type": "string" }
            }
        })
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let limit = clamped_limit(&input, "limit", 5, 100)?;
        let more_info = optional_bool(&input, "more_info")?.unwrap_or(false);
        let projects = context
            .client
            .list_projects(
                optional_str(&input, "project_name"),
                optional_str(&input, "reference_dataset_id"),
                limit,
            )
            .await?;

        if more_info {
            return Ok(ToolResult::json(json!({ "projects": projects })));
        }

        let simple: Vec<Value> = projects
            .iter()
            .map(|project| {
                let mut entry = json!({
                    "name": project.get("name").cloned().unwrap_or(Value::Null),
                    "project_id": project.get("id").cloned().unwrap_or(Value::Null),
                });
                if let Some(deployment_id) = find_in_dict(project, "deployment_id")
                    && !deployment_id.is_null()
                {
                    entry["agent_deployment_id"] = deployment_id.clone();
                }
                entry
            })
            .collect();
        Ok(ToolResult::json(json!({ "projects": simple })))
    }
}
