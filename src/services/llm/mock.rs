//! Scripted completion provider for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use breezer_llm::{
    CompletionProvider, CompletionRequest, LlmError, LlmResponse, LlmResult, ToolCall,
};

/// Returns predefined responses in sequence and records every request.
pub(crate) struct MockProvider {
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub(crate) fn new(responses: Vec<LlmResult<LlmResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub(crate) fn with_text(text: &str) -> Self {
        Self::new(vec![Ok(LlmResponse::text(text, "mock-model"))])
    }

    /// Sleep before answering; pair with a paused tokio clock.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn models_called(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.model).collect()
    }
}

pub(crate) fn text(content: &str) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::text(content, "mock-model"))
}

pub(crate) fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::tool_use(
        vec![ToolCall::new(id, name, arguments)],
        "mock-model",
    ))
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<LlmResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::Other {
                message: "No more mock responses available".to_string(),
            })
        } else {
            responses.remove(0)
        }
    }
}
