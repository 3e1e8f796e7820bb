//! Shared fixtures.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use breezer::models::AppConfig;
use breezer::services::NoopCodeSearch;
use breezer::AppState;
use breezer_llm::{
    CompletionProvider, CompletionRequest, LlmError, LlmResponse, LlmResult, ToolCall,
};

/// Provider that replays scripted replies and records each request.
pub struct ScriptedProvider {
    replies: Mutex<Vec<LlmResult<LlmResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<LlmResult<LlmResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.model).collect()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<LlmResponse> {
        self.requests.lock().unwrap().push(request);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(LlmError::Other {
                message: "script exhausted".to_string(),
            });
        }
        replies.remove(0)
    }
}

pub fn text(content: &str) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::text(content, "scripted"))
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::tool_use(
        vec![ToolCall::new(id, name, arguments)],
        "scripted",
    ))
}

/// Config with distinct, recognizable model ids for every role.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.models.implementation = "impl-model".to_string();
    config.models.review = "review-model".to_string();
    config.models.debug = "debug-model".to_string();
    config.models.fallback = "fallback-model".to_string();
    config.models.tool_routing = "tool-router".to_string();
    config.models.synthesis = "synthesizer".to_string();
    config
}

pub fn build_state(provider: Arc<ScriptedProvider>, config: AppConfig) -> AppState {
    AppState::build(config, provider, Arc::new(NoopCodeSearch)).unwrap()
}
