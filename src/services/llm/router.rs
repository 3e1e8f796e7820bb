//! Model Router
//!
//! Chooses the model for each completion and bounds every call with a
//! deadline. Plain handler completions get one retry on the configured
//! fallback model; the tool-capable strategy calls explicit models and never
//! falls back, since its two phases must use their own models.

use std::sync::Arc;
use std::time::Duration;

use breezer_llm::{CompletionProvider, CompletionRequest, LlmError, LlmResponse, LlmResult, Message};

use crate::models::handler::HandlerId;
use crate::models::settings::ModelSettings;

/// Routes completions to models over a single provider binding.
pub struct ModelRouter {
    provider: Arc<dyn CompletionProvider>,
    models: ModelSettings,
    timeout: Duration,
}

impl ModelRouter {
    pub fn new(provider: Arc<dyn CompletionProvider>, models: ModelSettings, timeout: Duration) -> Self {
        Self {
            provider,
            models,
            timeout,
        }
    }

    pub fn models(&self) -> &ModelSettings {
        &self.models
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Run one completion exactly as requested, bounded by the router's
    /// deadline.
    pub async fn complete(&self, request: CompletionRequest) -> LlmResult<LlmResponse> {
        let seconds = self.timeout.as_secs();
        tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| LlmError::Timeout { seconds })?
    }

    /// Plain completion on the handler's model, retried once on the fallback
    /// model when the primary fails.
    pub async fn complete_for(
        &self,
        handler: HandlerId,
        messages: Vec<Message>,
        temperature: f32,
    ) -> LlmResult<LlmResponse> {
        let model = self.models.for_handler(handler);
        tracing::info!(handler = %handler, model, "Routing completion");

        let request = CompletionRequest::new(messages.clone(), model, temperature);
        match self.complete(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::error!(handler = %handler, model, error = %err, "Model failed");

                let fallback = self.models.fallback();
                if fallback == model {
                    return Err(err);
                }

                tracing::warn!(handler = %handler, fallback, "Retrying with fallback model");
                self.complete(CompletionRequest::new(messages, fallback, temperature))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::mock::{self, MockProvider};

    fn models() -> ModelSettings {
        ModelSettings {
            review: "primary-model".to_string(),
            fallback: "fallback-model".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_uses_handler_model() {
        let provider = Arc::new(MockProvider::with_text("ok"));
        let router = ModelRouter::new(provider.clone(), models(), Duration::from_secs(5));

        let response = router
            .complete_for(HandlerId::Review, vec![Message::user("hi")], 0.4)
            .await
            .unwrap();
        assert_eq!(response.content_text(), "ok");
        assert_eq!(provider.models_called(), vec!["primary-model"]);
        assert_eq!(provider.requests()[0].temperature, 0.4);
    }

    #[tokio::test]
    async fn test_retries_on_fallback_model() {
        let provider = Arc::new(MockProvider::new(vec![
            Err(LlmError::ServerError {
                message: "overloaded".to_string(),
                status: Some(503),
            }),
            mock::text("from fallback"),
        ]));
        let router = ModelRouter::new(provider.clone(), models(), Duration::from_secs(5));

        let response = router
            .complete_for(HandlerId::Review, vec![Message::user("hi")], 0.4)
            .await
            .unwrap();
        assert_eq!(response.content_text(), "from fallback");
        assert_eq!(
            provider.models_called(),
            vec!["primary-model", "fallback-model"]
        );
    }

    #[tokio::test]
    async fn test_no_retry_when_fallback_is_primary() {
        let provider = Arc::new(MockProvider::new(vec![Err(LlmError::NetworkError {
            message: "reset".to_string(),
        })]));
        let settings = ModelSettings {
            review: "same".to_string(),
            fallback: "same".to_string(),
            ..Default::default()
        };
        let router = ModelRouter::new(provider.clone(), settings, Duration::from_secs(5));

        let err = router
            .complete_for(HandlerId::Review, vec![Message::user("hi")], 0.4)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NetworkError { .. }));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_provider_times_out() {
        let provider = Arc::new(MockProvider::with_text("late").with_delay(Duration::from_secs(30)));
        let router = ModelRouter::new(provider, models(), Duration::from_secs(10));

        let err = router
            .complete(CompletionRequest::new(vec![Message::user("hi")], "m", 0.3))
            .await
            .unwrap_err();
        assert_eq!(err, LlmError::Timeout { seconds: 10 });
    }
}
