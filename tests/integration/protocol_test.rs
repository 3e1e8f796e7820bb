//! Continuation Protocol Integration Tests
//!
//! Pause on a tool request, resume with results, and the store discipline
//! around both.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use breezer::models::{QueryRequest, SuggestedAction, ToolResultRequest};
use breezer::AppError;
use breezer_core::ToolCallResult;
use breezer_llm::MessageRole;

use super::support::{build_state, test_config, text, tool_call, ScriptedProvider};

fn implement_request() -> QueryRequest {
    QueryRequest::new("/ws", "implement a rate limiter")
}

fn results(id: &str) -> Vec<ToolCallResult> {
    vec![ToolCallResult::new(id, "file_read", "pub struct Limiter;")]
}

#[tokio::test]
async fn test_final_content_comes_from_synthesis_model() {
    let provider = ScriptedProvider::new(vec![
        text("phase A draft"),
        text("phase B answer\n```python\nx = 1\n```\n```go\nvar y = 2\n```"),
    ]);
    let state = build_state(provider.clone(), test_config());

    let response = state
        .agent_service()
        .submit_query(implement_request())
        .await
        .unwrap();

    assert!(response.content.starts_with("phase B answer"));
    assert!(!response.requires_tool);
    assert_eq!(provider.models_called(), vec!["tool-router", "synthesizer"]);
    assert_eq!(response.metadata["models_used"]["tool_phase"], "tool-router");
    assert_eq!(response.metadata["models_used"]["final"], "synthesizer");

    assert_eq!(
        response.actions,
        vec![
            SuggestedAction::CreateFile {
                language: "python".to_string(),
                code: "x = 1".to_string(),
                description: "Apply python code".to_string(),
            },
            SuggestedAction::EditFile {
                language: "go".to_string(),
                code: "var y = 2".to_string(),
                description: "Apply go code".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_tool_request_pauses_and_stores_state() {
    let provider = ScriptedProvider::new(vec![tool_call(
        "call_7",
        "file_read",
        json!({"path": "src/limiter.rs"}),
    )]);
    let state = build_state(provider.clone(), test_config());

    let response = state
        .agent_service()
        .submit_query(implement_request())
        .await
        .unwrap();

    assert!(response.requires_tool);
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_7");
    assert_eq!(response.tool_calls[0].arguments["path"], "src/limiter.rs");
    // Phase B never ran
    assert_eq!(provider.models_called(), vec!["tool-router"]);

    let stored = state.store().get(&response.request_id).await.unwrap();
    let last = stored.last_message().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.tool_calls[0].id, "call_7");
}

#[tokio::test]
async fn test_resumption_to_terminal_clears_store() {
    let provider = ScriptedProvider::new(vec![
        tool_call("call_1", "file_read", json!({"path": "a.rs"})),
        text("no more tools"),
        text("```rust\nstruct Limiter;\n```"),
    ]);
    let state = build_state(provider.clone(), test_config());
    let service = state.agent_service();

    let paused = service.submit_query(implement_request()).await.unwrap();
    let done = service
        .submit_tool_results(ToolResultRequest {
            request_id: paused.request_id.clone(),
            tool_results: results("call_1"),
        })
        .await
        .unwrap();

    assert!(done.success);
    assert!(!done.requires_tool);
    assert_eq!(done.confidence, 0.9);
    assert!(state.store().get(&paused.request_id).await.is_none());

    // The resumed Phase A saw the tool turn
    let resumed = &provider.requests()[1].messages;
    let tool_turn = resumed.last().unwrap();
    assert_eq!(tool_turn.role, MessageRole::Tool);
    assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_1"));
}

#[tokio::test]
async fn test_multiple_rounds_then_cap() {
    let mut config = test_config();
    config.max_tool_rounds = 2;
    let provider = ScriptedProvider::new(vec![
        tool_call("c1", "file_read", json!({"path": "a"})),
        tool_call("c2", "file_read", json!({"path": "b"})),
        tool_call("c3", "file_read", json!({"path": "c"})),
    ]);
    let state = build_state(provider.clone(), config);
    let service = state.agent_service();

    let first = service.submit_query(implement_request()).await.unwrap();
    let second = service
        .submit_tool_results(ToolResultRequest {
            request_id: first.request_id.clone(),
            tool_results: results("c1"),
        })
        .await
        .unwrap();
    assert!(second.requires_tool);
    assert_eq!(second.metadata["tool_rounds"], 1);

    let third = service
        .submit_tool_results(ToolResultRequest {
            request_id: first.request_id.clone(),
            tool_results: results("c2"),
        })
        .await
        .unwrap();
    assert!(third.requires_tool);
    assert_eq!(third.metadata["tool_rounds"], 2);

    let err = service
        .submit_tool_results(ToolResultRequest {
            request_id: first.request_id.clone(),
            tool_results: results("c3"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TooManyToolRounds { limit: 2 }));
    assert!(state.store().get(&first.request_id).await.is_none());
    assert_eq!(provider.requests().len(), 3);
}

#[tokio::test]
async fn test_unsupported_continuation_is_an_error() {
    let state = build_state(ScriptedProvider::new(vec![]), test_config());
    let paused = breezer::models::ConversationState::new(
        breezer::models::HandlerId::Security,
        implement_request().to_context().unwrap(),
        vec![breezer_llm::Message::user("audit")],
    );

    let err = state
        .orchestrator()
        .continue_with_tool("security", paused, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedContinuation(name) if name == "security"));
}

#[tokio::test]
async fn test_duplicate_resumption_has_one_winner() {
    let provider = ScriptedProvider::new(vec![
        tool_call("call_1", "git_status", json!({})),
        text("no tools"),
        text("final"),
    ]);
    let state = Arc::new(build_state(provider, test_config()));
    let paused = state
        .agent_service()
        .submit_query(implement_request())
        .await
        .unwrap();

    let submit = |state: Arc<breezer::AppState>, id: String| async move {
        state
            .agent_service()
            .submit_tool_results(ToolResultRequest {
                request_id: id,
                tool_results: results("call_1"),
            })
            .await
    };
    let (a, b) = tokio::join!(
        submit(state.clone(), paused.request_id.clone()),
        submit(state.clone(), paused.request_id.clone()),
    );

    let outcomes = [a, b];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    let missing = outcomes
        .iter()
        .filter(|r| matches!(r, Err(AppError::NoPendingToolCall(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(missing, 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_request_cannot_resume() {
    let mut config = test_config();
    config.tool_state_ttl_secs = 60;
    let provider = ScriptedProvider::new(vec![tool_call("call_1", "git_status", json!({}))]);
    let state = build_state(provider, config);

    let paused = state
        .agent_service()
        .submit_query(implement_request())
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;

    let err = state
        .agent_service()
        .submit_tool_results(ToolResultRequest {
            request_id: paused.request_id.clone(),
            tool_results: results("call_1"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoPendingToolCall(_)));
    assert!(err.is_not_found());
    assert!(state.store().get(&paused.request_id).await.is_none());
}
