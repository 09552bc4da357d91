//! HTTP client for the LangSmith REST API.
//!
//! Every tool in this server is a thin wrapper over these calls: the client
//! authenticates with an API key header, issues one request, and returns the
//! decoded JSON. No retries, no caching, no cross-call state.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::Config;

/// LangSmith API maximum for the `limit` parameter of run queries.
pub const LIST_RUNS_MAX_LIMIT: usize = 100;

const API_KEY_HEADER: &str = "x-api-key";
const WORKSPACE_HEADER: &str = "x-tenant-id";

// === Types ===

/// Errors surfaced by vendor API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("LangSmith API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error talking to LangSmith: {0}")]
    Network(#[from] reqwest::Error),
    #[error("failed to decode LangSmith response: {0}")]
    Decode(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Query parameters for `POST /runs/query`, mirroring the fields the run
/// tools expose. `None` fields are omitted from the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub session: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_root: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_example: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    pub limit: usize,
}

/// Filters for `GET /datasets`.
#[derive(Debug, Clone, Default)]
pub struct DatasetQuery {
    pub dataset_ids: Vec<String>,
    pub data_type: Option<String>,
    pub name: Option<String>,
    pub name_contains: Option<String>,
    pub metadata: Option<Value>,
    pub limit: usize,
}

/// Filters for `GET /examples`.
#[derive(Debug, Clone, Default)]
pub struct ExampleQuery {
    pub dataset_id: Option<String>,
    pub example_ids: Vec<String>,
    pub filter: Option<String>,
    pub metadata: Option<Value>,
    pub splits: Vec<String>,
    pub inline_s3_urls: Option<bool>,
    pub include_attachments: Option<bool>,
    pub as_of: Option<String>,
    pub offset: Option<usize>,
    pub limit: usize,
}

/// Client for the LangSmith REST API (`/api/v1`).
#[must_use]
#[derive(Clone)]
pub struct LangSmithClient {
    http: reqwest::Client,
    base_url: String,
}

// === LangSmithClient ===

impl LangSmithClient {
    /// Create a client from server configuration.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let api_key = config
            .api_key()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&api_key)
                .map_err(|_| ClientError::InvalidConfig("API key contains invalid header characters".to_string()))?,
        );
        if let Some(workspace_id) = config.workspace_id() {
            headers.insert(
                WORKSPACE_HEADER,
                HeaderValue::from_str(&workspace_id)
                    .map_err(|_| ClientError::InvalidConfig("workspace_id contains invalid header characters".to_string()))?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/api/v1", config.endpoint()),
        })
    }

    async fn decode(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ClientError> {
        tracing::debug!(path, "GET {path}");
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        tracing::debug!(path, "POST {path}");
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    // === Projects ===

    /// List tracing projects ("sessions" in the REST API).
    pub async fn list_projects(
        &self,
        name_contains: Option<&str>,
        reference_dataset_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Value>, ClientError> {
        let mut query: Vec<(&str, String)> = vec![
            ("reference_free", "true".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(name) = name_contains {
            query.push(("name_contains", name.to_string()));
        }
        if let Some(dataset_id) = reference_dataset_id {
            query.push(("reference_dataset", dataset_id.to_string()));
        }
        let value = self.get("/sessions", &query).await?;
        as_array(value, "sessions")
    }

    /// Resolve an exact project name to its session id.
    pub async fn resolve_project_id(&self, project_name: &str) -> Result<String, ClientError> {
        let query = vec![("name", project_name.to_string()), ("limit", "1".to_string())];
        let value = self.get("/sessions", &query).await?;
        let sessions = as_array(value, "sessions")?;
        sessions
            .first()
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::ProjectNotFound(project_name.to_string()))
    }

    // === Runs ===

    /// Query runs. `query.session` must hold resolved session ids; use
    /// [`Self::resolve_project_id`] to map project names first.
    pub async fn list_runs(&self, query: &RunQuery) -> Result<Vec<Value>, ClientError> {
        let body = serde_json::to_value(query).map_err(|e| ClientError::Decode(e.to_string()))?;
        let value = self.post("/runs/query", &body).await?;
        as_array(value, "runs")
    }

    /// Aggregate run statistics over projects or a single trace.
    pub async fn run_stats(
        &self,
        session_ids: &[String],
        trace_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let mut body = json!({});
        if !session_ids.is_empty() {
            body["session"] = json!(session_ids);
        }
        if let Some(trace) = trace_id {
            body["trace"] = json!(trace);
        }
        self.post("/runs/stats", &body).await
    }

    // === Datasets & examples ===

    pub async fn list_datasets(&self, query: &DatasetQuery) -> Result<Vec<Value>, ClientError> {
        let mut params: Vec<(&str, String)> = vec![("limit", query.limit.to_string())];
        for id in &query.dataset_ids {
            params.push(("id", id.clone()));
        }
        if let Some(data_type) = &query.data_type {
            params.push(("data_type", data_type.clone()));
        }
        if let Some(name) = &query.name {
            params.push(("name", name.clone()));
        }
        if let Some(name_contains) = &query.name_contains {
            params.push(("name_contains", name_contains.clone()));
        }
        if let Some(metadata) = &query.metadata {
            params.push(("metadata", metadata.to_string()));
        }
        let value = self.get("/datasets", &params).await?;
        as_array(value, "datasets")
    }

    pub async fn read_dataset_by_id(&self, dataset_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/datasets/{dataset_id}"), &[]).await
    }

    pub async fn read_dataset_by_name(&self, name: &str) -> Result<Value, ClientError> {
        let params = vec![("name", name.to_string()), ("limit", "1".to_string())];
        let value = self.get("/datasets", &params).await?;
        let mut datasets = as_array(value, "datasets")?;
        if datasets.is_empty() {
            return Err(ClientError::Http {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: format!("Dataset not found: {name}"),
            });
        }
        Ok(datasets.remove(0))
    }

    pub async fn list_examples(&self, query: &ExampleQuery) -> Result<Vec<Value>, ClientError> {
        let mut params: Vec<(&str, String)> = vec![("limit", query.limit.to_string())];
        if let Some(dataset_id) = &query.dataset_id {
            params.push(("dataset", dataset_id.clone()));
        }
        for id in &query.example_ids {
            params.push(("id", id.clone()));
        }
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(metadata) = &query.metadata {
            params.push(("metadata", metadata.to_string()));
        }
        for split in &query.splits {
            params.push(("splits", split.clone()));
        }
        if let Some(inline) = query.inline_s3_urls {
            params.push(("inline_s3_urls", inline.to_string()));
        }
        if let Some(attachments) = query.include_attachments {
            params.push(("include_attachments", attachments.to_string()));
        }
        if let Some(as_of) = &query.as_of {
            params.push(("as_of", as_of.clone()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }
        let value = self.get("/examples", &params).await?;
        as_array(value, "examples")
    }

    pub async fn read_example(
        &self,
        example_id: &str,
        as_of: Option<&str>,
    ) -> Result<Value, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(as_of) = as_of {
            params.push(("as_of", as_of.to_string()));
        }
        self.get(&format!("/examples/{example_id}"), &params).await
    }

    // === Prompts ===

    /// List prompt repos, optionally restricted to public or private ones.
    pub async fn list_prompts(
        &self,
        is_public: bool,
        limit: usize,
    ) -> Result<Vec<Value>, ClientError> {
        let params = vec![
            ("is_public", is_public.to_string()),
            ("limit", limit.to_string()),
        ];
        let value = self.get("/repos", &params).await?;
        as_array(value, "repos")
    }

    /// Fetch one prompt repo by `owner/name` identifier. Unqualified names
    /// resolve against the default owner `-`.
    pub async fn get_prompt(&self, prompt_name: &str) -> Result<Value, ClientError> {
        let (owner, name) = match prompt_name.split_once('/') {
            Some((owner, name)) => (owner, name),
            None => ("-", prompt_name),
        };
        let value = self.get(&format!("/repos/{owner}/{name}"), &[]).await?;
        // The repos endpoint wraps the payload in {"repo": {...}}.
        Ok(value.get("repo").cloned().unwrap_or(value))
    }

    // === Workspaces & billing ===

    pub async fn list_workspaces(&self) -> Result<Vec<Value>, ClientError> {
        let value = self.get("/workspaces", &[]).await?;
        as_array(value, "workspaces")
    }

    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/workspaces/{workspace_id}"), &[]).await
    }

    /// Org billing usage (trace counts) for a date range.
    pub async fn billing_usage(
        &self,
        starting_on: &str,
        ending_before: &str,
        on_current_plan: bool,
    ) -> Result<Vec<Value>, ClientError> {
        let params = vec![
            ("starting_on", starting_on.to_string()),
            ("ending_before", ending_before.to_string()),
            ("on_current_plan", on_current_plan.to_string()),
        ];
        let value = self.get("/orgs/current/billing/usage", &params).await?;
        match value {
            Value::Array(items) => Ok(items),
            other => Err(ClientError::Decode(format!(
                "expected a billing usage array, got: {other}"
            ))),
        }
    }
}

/// Accept both bare-array and `{key: [...]}` response shapes; list endpoints
/// have returned either across API versions.
fn as_array(value: Value, key: &str) -> Result<Vec<Value>, ClientError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ClientError::Decode(format!(
                "expected an array or an object with key '{key}'"
            ))),
        },
        other => Err(ClientError::Decode(format!(
            "expected an array response, got: {other}"
        ))),
    }
}
