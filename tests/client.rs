//! Integration tests for the LangSmith REST client against a mock API.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use langsmith_mcp::client::{LangSmithClient, RunQuery};
use langsmith_mcp::config::Config;

fn client_for(server: &MockServer) -> LangSmithClient {
    let config = Config {
        api_key: Some("test-key".to_string()),
        endpoint: Some(server.uri()),
        ..Config::default()
    };
    LangSmithClient::new(&config).unwrap()
}

#[tokio::test]
async fn sends_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let workspaces = client_for(&server).list_workspaces().await.unwrap();
    assert!(workspaces.is_empty());
}

#[tokio::test]
async fn sends_workspace_header_when_configured() {
    let server = MockServer::start().await;
    let workspace_id = "123e4567-e89b-12d3-a456-426614174000";
    Mock::given(method("GET"))
        .and(path("/api/v1/workspaces"))
        .and(header("x-tenant-id", workspace_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        api_key: Some("test-key".to_string()),
        endpoint: Some(server.uri()),
        workspace_id: Some(workspace_id.to_string()),
        ..Config::default()
    };
    let client = LangSmithClient::new(&config).unwrap();
    client.list_workspaces().await.unwrap();
}

#[tokio::test]
async fn resolves_project_name_to_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .and(query_param("name", "my-project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "sess-42", "name": "my-project"}
        ])))
        .mount(&server)
        .await;

    let id = client_for(&server)
        .resolve_project_id("my-project")
        .await
        .unwrap();
    assert_eq!(id, "sess-42");
}

#[tokio::test]
async fn missing_project_is_a_named_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .resolve_project_id("ghost")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[tokio::test]
async fn list_runs_posts_query_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/runs/query"))
        .and(body_partial_json(json!({
            "session": ["sess-1"],
            "run_type": "llm",
            "limit": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "runs": [{"id": "run-1"}, {"id": "run-2"}]
        })))
        .mount(&server)
        .await;

    let query = RunQuery {
        session: vec!["sess-1".to_string()],
        run_type: Some("llm".to_string()),
        limit: 10,
        ..RunQuery::default()
    };
    let runs = client_for(&server).list_runs(&query).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["id"], "run-1");
}

#[tokio::test]
async fn http_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/runs/query"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_runs(&RunQuery {
            limit: 1,
            ..RunQuery::default()
        })
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("403"), "message was: {message}");
    assert!(message.contains("invalid api key"), "message was: {message}");
}

#[tokio::test]
async fn get_prompt_defaults_owner_and_unwraps_repo() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/-/my-prompt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repo": {"repo_handle": "my-prompt", "is_public": false}
        })))
        .mount(&server)
        .await;

    let prompt = client_for(&server).get_prompt("my-prompt").await.unwrap();
    assert_eq!(prompt["repo_handle"], "my-prompt");
}

#[tokio::test]
async fn get_prompt_honors_qualified_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/team/shared"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repo": {"repo_handle": "shared"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).get_prompt("team/shared").await.unwrap();
}

#[tokio::test]
async fn read_dataset_by_name_requires_a_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/datasets"))
        .and(query_param("name", "eval-set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "ds-1", "name": "eval-set"}
        ])))
        .mount(&server)
        .await;

    let dataset = client_for(&server)
        .read_dataset_by_name("eval-set")
        .await
        .unwrap();
    assert_eq!(dataset["id"], "ds-1");
}

#[tokio::test]
async fn billing_usage_passes_date_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/current/billing/usage"))
        .and(query_param("starting_on", "2026-08-01"))
        .and(query_param("ending_before", "2026-09-01"))
        .and(query_param("on_current_plan", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"metric": "traces", "groups": {"ws-1": 12}}
        ])))
        .mount(&server)
        .await;

    let usage = client_for(&server)
        .billing_usage("2026-08-01", "2026-09-01", true)
        .await
        .unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0]["metric"], "traces");
}
