//! Tool Loop Integration Tests
//!
//! Drives a paused request the way a client would: run the requested tools
//! in the workspace, submit their output, repeat until the answer is final.

use serde_json::json;
use tempfile::TempDir;

use breezer::models::{QueryRequest, QueryResponse, ToolResultRequest};
use breezer::AppState;
use breezer_core::ToolCallResult;
use breezer_tools::{ToolExecutionError, ToolExecutionService};
use breezer_llm::MessageRole;

use super::support::{build_state, test_config, text, tool_call, ScriptedProvider};

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(
        dir.path().join("src/lib.rs"),
        "pub fn limit(n: u32) -> u32 { n }\n",
    )
    .unwrap();
    dir
}

async fn run_tools(executor: &ToolExecutionService, response: &QueryResponse) -> Vec<ToolCallResult> {
    let mut results = Vec::new();
    for call in &response.tool_calls {
        let output = match executor.execute(&call.name, &call.arguments).await {
            Ok(value) => value.to_string(),
            Err(e) => format!("Error: {}", e),
        };
        results.push(ToolCallResult::new(call.id.as_str(), call.name.as_str(), output));
    }
    results
}

async fn drive(state: &AppState, workspace: &str, query: &str) -> QueryResponse {
    let service = state.agent_service();
    let executor = state.tool_executor(workspace).unwrap();

    let mut response = service
        .submit_query(QueryRequest::new(workspace, query))
        .await
        .unwrap();
    while response.requires_tool {
        let tool_results = run_tools(&executor, &response).await;
        response = service
            .submit_tool_results(ToolResultRequest {
                request_id: response.request_id.clone(),
                tool_results,
            })
            .await
            .unwrap();
    }
    response
}

#[tokio::test]
async fn test_file_read_result_reaches_the_model() {
    let dir = workspace();
    let ws = dir.path().to_string_lossy().into_owned();
    let provider = ScriptedProvider::new(vec![
        tool_call("call_1", "file_read", json!({"path": "src/lib.rs"})),
        text("enough"),
        text("```rust\npub fn limit(n: u32) -> u32 { n.min(10) }\n```"),
    ]);
    let state = build_state(provider.clone(), test_config());

    let response = drive(&state, &ws, "add a cap to limit").await;

    assert!(response.success);
    assert_eq!(response.actions.len(), 1);

    let resumed = &provider.requests()[1].messages;
    let tool_turn = resumed.last().unwrap();
    assert_eq!(tool_turn.role, MessageRole::Tool);
    assert!(tool_turn.content.contains("pub fn limit"));
}

#[tokio::test]
async fn test_path_escape_is_reported_to_the_model() {
    let dir = workspace();
    let ws = dir.path().to_string_lossy().into_owned();
    let provider = ScriptedProvider::new(vec![
        tool_call("call_1", "file_read", json!({"path": "../../etc/passwd"})),
        text("cannot read that"),
        text("Use a config file instead."),
    ]);
    let state = build_state(provider.clone(), test_config());

    let response = drive(&state, &ws, "add a user lookup").await;
    assert!(response.success);

    let tool_turn = provider.requests()[1].messages.last().cloned().unwrap();
    assert!(tool_turn.content.starts_with("Error:"));
}

#[tokio::test]
async fn test_executor_rejects_escape_and_unlisted_commands() {
    let dir = workspace();
    let executor = ToolExecutionService::new(
        &dir.path().to_string_lossy(),
        test_config().tools,
    )
    .unwrap();

    let err = executor
        .execute("file_read", &json!({"path": "../outside.txt"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolExecutionError::PathEscape(_)));

    let err = executor
        .execute("terminal_command", &json!({"command": "rm -rf /"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolExecutionError::CommandNotPermitted(_)));
}
