//! Routing Integration Tests
//!
//! Classification table, handler routing and the handler listing.

use breezer::models::{HandlerId, QueryRequest};
use breezer::services::strategy::{classify, RequestType};

use super::support::{build_state, test_config, text, ScriptedProvider};

// ============================================================================
// Classifier
// ============================================================================

#[test]
fn test_implement_only_queries() {
    for query in ["create a parser", "Build it", "write tests", "make a CLI"] {
        assert_eq!(classify(query), RequestType::Implement, "query: {}", query);
    }
}

#[test]
fn test_unmatched_queries_are_unknown() {
    for query in ["hello", "thanks!", "", "lorem ipsum"] {
        assert_eq!(classify(query), RequestType::Unknown, "query: {}", query);
    }
}

#[test]
fn test_review_checked_before_debug() {
    assert_eq!(classify("please review this bug"), RequestType::Review);
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_debug_query_uses_debug_model() {
    let provider = ScriptedProvider::new(vec![text("Root cause: null deref")]);
    let state = build_state(provider.clone(), test_config());

    let response = state
        .agent_service()
        .submit_query(QueryRequest::new("/ws", "the upload is broken"))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.content, "Root cause: null deref");
    assert_eq!(provider.models_called(), vec!["debug-model"]);
}

#[tokio::test]
async fn test_explain_routes_to_review_which_needs_selection() {
    let provider = ScriptedProvider::new(vec![]);
    let state = build_state(provider.clone(), test_config());

    let response = state
        .agent_service()
        .submit_query(QueryRequest::new("/ws", "explain this"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.confidence, 0.0);
    assert_eq!(response.content, "No code selected for review");
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_plain_handler_falls_back_once() {
    let provider = ScriptedProvider::new(vec![
        Err(breezer_llm::LlmError::ServerError {
            message: "overloaded".to_string(),
            status: Some(503),
        }),
        text("fallback review"),
    ]);
    let state = build_state(provider.clone(), test_config());

    let mut request = QueryRequest::new("/ws", "review please");
    request.selected_code = Some("let a = 1;".to_string());
    let response = state.agent_service().submit_query(request).await.unwrap();

    assert!(response.success);
    assert_eq!(response.content, "fallback review");
    assert_eq!(provider.models_called(), vec!["review-model", "fallback-model"]);
}

#[tokio::test]
async fn test_multi_agent_passes_previous_response() {
    let provider = ScriptedProvider::new(vec![text("two issues found"), text("# Notes")]);
    let state = build_state(provider.clone(), test_config());

    let mut request = QueryRequest::new("/ws", "look at this");
    request.selected_code = Some("fn f() {}".to_string());
    let sequence = ["review", "nonexistent", "documentation"].map(String::from);

    let response = state
        .agent_service()
        .submit_multi_agent(request, &sequence)
        .await
        .unwrap();

    assert_eq!(
        response.handlers_used,
        vec![HandlerId::Review, HandlerId::Documentation]
    );
    let doc_prompt = &provider.requests()[1].messages[1].content;
    assert!(doc_prompt.contains("Documentation Request: look at this"));
    assert_eq!(response.responses[1].content, "# Notes");
}

#[test]
fn test_list_handlers() {
    let state = build_state(ScriptedProvider::new(vec![]), test_config());
    let list = state.agent_service().list_handlers();

    let names: Vec<HandlerId> = list.handlers.iter().map(|h| h.name).collect();
    assert_eq!(names, HandlerId::ALL.to_vec());

    let tool_capable: Vec<HandlerId> = list
        .handlers
        .iter()
        .filter(|h| h.supports_tools)
        .map(|h| h.name)
        .collect();
    assert_eq!(tool_capable, vec![HandlerId::Implementation]);
    assert_eq!(list.handlers[0].description, "Generates and edits code");
}
