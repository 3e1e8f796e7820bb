//! Orchestrator Service
//!
//! Classifies each request, dispatches it to one handler and forwards tool
//! continuations to the handler that paused. Dispatch problems (an
//! unregistered handler or a panicking one) come back as failure outcomes
//! rather than errors.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use breezer_core::{RequestContext, ToolCallResult};

use crate::models::conversation::ConversationState;
use crate::models::handler::{HandlerDescriptor, HandlerId};
use crate::models::outcome::Outcome;
use crate::services::handlers::Handler;
use crate::services::strategy::{classify, RequestType};
use crate::utils::error::{AppError, AppResult};

/// Handler that serves each request type.
pub fn route(request_type: RequestType) -> HandlerId {
    match request_type {
        RequestType::Implement => HandlerId::Implementation,
        RequestType::Review => HandlerId::Review,
        RequestType::Debug => HandlerId::Debug,
        RequestType::Refactor => HandlerId::Implementation,
        RequestType::Explain => HandlerId::Review,
        RequestType::Unknown => HandlerId::Implementation,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Registry of handlers plus routing.
pub struct Orchestrator {
    handlers: HashMap<HandlerId, Arc<dyn Handler>>,
}

impl Orchestrator {
    /// Register handlers. A later handler with the same id replaces an
    /// earlier one.
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|handler| (handler.id(), handler))
            .collect();
        Self { handlers }
    }

    pub fn handler(&self, id: HandlerId) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(&id)
    }

    /// Classify the query and run the routed handler.
    pub async fn process(&self, context: &RequestContext) -> Outcome {
        let request_type = classify(context.user_query());
        let target = route(request_type);
        tracing::info!(request_type = %request_type, handler = %target, "Classified request");
        self.dispatch(target, context).await
    }

    async fn dispatch(&self, id: HandlerId, context: &RequestContext) -> Outcome {
        let Some(handler) = self.handlers.get(&id) else {
            tracing::error!(handler = %id, "Handler not registered");
            return Outcome::failure(format!(
                "Request processing failed: handler '{}' is not available",
                id
            ));
        };

        match AssertUnwindSafe(handler.process(context)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(handler = %id, panic = %message, "Handler panicked");
                Outcome::failure(format!("Request processing failed: {}", message))
            }
        }
    }

    /// Resume a paused exchange on the named handler.
    pub async fn continue_with_tool(
        &self,
        handler_name: &str,
        state: ConversationState,
        results: Vec<ToolCallResult>,
    ) -> AppResult<Outcome> {
        let handler = handler_name
            .parse::<HandlerId>()
            .ok()
            .and_then(|id| self.handlers.get(&id))
            .ok_or_else(|| AppError::UnknownHandler(handler_name.to_string()))?;

        tracing::info!(
            handler = handler_name,
            results = results.len(),
            tool_rounds = state.tool_rounds,
            "Continuing with tool results"
        );

        AssertUnwindSafe(handler.continue_with_tool(state, results))
            .catch_unwind()
            .await
            .map_err(|payload| {
                AppError::internal(format!(
                    "Handler '{}' panicked: {}",
                    handler_name,
                    panic_message(payload.as_ref())
                ))
            })?
    }

    /// Run handlers in sequence. Each handler sees the previous handlers'
    /// replies as `{name}_response` entries in the additional context.
    /// Unknown names are skipped.
    pub async fn process_multi_agent(
        &self,
        context: &RequestContext,
        sequence: &[String],
    ) -> Vec<(HandlerId, Outcome)> {
        let mut context = context.clone();
        let mut outcomes = Vec::with_capacity(sequence.len());

        for name in sequence {
            let id = match name.parse::<HandlerId>() {
                Ok(id) if self.handlers.contains_key(&id) => id,
                _ => {
                    tracing::warn!(handler = %name, "Skipping unknown handler");
                    continue;
                }
            };

            let outcome = self.dispatch(id, &context).await;
            context = context.with_additional(format!("{}_response", id), outcome.content.clone());
            outcomes.push((id, outcome));
        }

        outcomes
    }

    /// Descriptors of registered handlers in canonical order.
    pub fn handlers(&self) -> Vec<HandlerDescriptor> {
        HandlerId::ALL
            .iter()
            .filter_map(|id| self.handlers.get(id))
            .map(|handler| handler.descriptor())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use breezer_llm::Message;
    use std::sync::Mutex;

    /// Handler that records the contexts it saw and echoes a fixed reply.
    struct EchoHandler {
        id: HandlerId,
        reply: &'static str,
        seen: Mutex<Vec<RequestContext>>,
    }

    impl EchoHandler {
        fn new(id: HandlerId, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<RequestContext> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Handler for EchoHandler {
        fn id(&self) -> HandlerId {
            self.id
        }

        fn description(&self) -> &'static str {
            "echo"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &["echo"]
        }

        async fn process(&self, context: &RequestContext) -> Outcome {
            self.seen.lock().unwrap().push(context.clone());
            Outcome::success(self.reply, 0.7)
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl Handler for PanickingHandler {
        fn id(&self) -> HandlerId {
            HandlerId::Review
        }

        fn description(&self) -> &'static str {
            "panics"
        }

        fn capabilities(&self) -> &'static [&'static str] {
            &[]
        }

        async fn process(&self, _context: &RequestContext) -> Outcome {
            panic!("handler exploded")
        }
    }

    fn ctx(query: &str) -> RequestContext {
        RequestContext::builder("/ws", query).build().unwrap()
    }

    #[test]
    fn test_route_table() {
        assert_eq!(route(RequestType::Implement), HandlerId::Implementation);
        assert_eq!(route(RequestType::Review), HandlerId::Review);
        assert_eq!(route(RequestType::Debug), HandlerId::Debug);
        assert_eq!(route(RequestType::Refactor), HandlerId::Implementation);
        assert_eq!(route(RequestType::Explain), HandlerId::Review);
        assert_eq!(route(RequestType::Unknown), HandlerId::Implementation);
    }

    #[tokio::test]
    async fn test_process_routes_by_classification() {
        let implementation = EchoHandler::new(HandlerId::Implementation, "impl");
        let review = EchoHandler::new(HandlerId::Review, "review");
        let orchestrator = Orchestrator::new(vec![implementation as Arc<dyn Handler>, review]);

        assert_eq!(orchestrator.process(&ctx("explain this")).await.content, "review");
        assert_eq!(orchestrator.process(&ctx("simplify this")).await.content, "impl");
        assert_eq!(orchestrator.process(&ctx("hello")).await.content, "impl");
    }

    #[tokio::test]
    async fn test_missing_handler_is_failure_outcome() {
        let orchestrator = Orchestrator::new(vec![EchoHandler::new(HandlerId::Review, "r")]);
        let outcome = orchestrator.process(&ctx("the upload is broken")).await;
        assert!(!outcome.success);
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.content.contains("debug"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_failure_outcome() {
        let orchestrator = Orchestrator::new(vec![Arc::new(PanickingHandler)]);
        let outcome = orchestrator.process(&ctx("review this")).await;
        assert!(!outcome.success);
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.content.contains("handler exploded"));
    }

    #[tokio::test]
    async fn test_continue_unknown_handler() {
        let orchestrator = Orchestrator::new(vec![EchoHandler::new(HandlerId::Review, "r")]);
        let state = ConversationState::new(HandlerId::Review, ctx("q"), vec![Message::user("q")]);

        let err = orchestrator
            .continue_with_tool("architect", state.clone(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownHandler(name) if name == "architect"));

        // known id but not registered
        let err = orchestrator
            .continue_with_tool("debug", state, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownHandler(_)));
    }

    #[tokio::test]
    async fn test_continue_unsupported_propagates() {
        let orchestrator = Orchestrator::new(vec![EchoHandler::new(HandlerId::Review, "r")]);
        let state = ConversationState::new(HandlerId::Review, ctx("q"), vec![Message::user("q")]);
        let err = orchestrator
            .continue_with_tool("review", state, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedContinuation(_)));
    }

    #[tokio::test]
    async fn test_multi_agent_threads_responses() {
        let review = EchoHandler::new(HandlerId::Review, "looks fine");
        let docs = EchoHandler::new(HandlerId::Documentation, "# Docs");
        let orchestrator = Orchestrator::new(vec![review.clone() as Arc<dyn Handler>, docs.clone()]);

        let sequence = vec![
            "review".to_string(),
            "architect".to_string(),
            "documentation".to_string(),
        ];
        let outcomes = orchestrator.process_multi_agent(&ctx("q"), &sequence).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, HandlerId::Review);
        assert_eq!(outcomes[1].0, HandlerId::Documentation);

        assert!(review.seen()[0].additional_context().is_empty());
        assert_eq!(
            docs.seen()[0].additional_str("review_response"),
            Some("looks fine")
        );
    }

    #[test]
    fn test_handlers_listed_in_canonical_order() {
        let orchestrator = Orchestrator::new(vec![
            EchoHandler::new(HandlerId::Devops, "d"),
            EchoHandler::new(HandlerId::Implementation, "i"),
        ]);
        let names: Vec<_> = orchestrator.handlers().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec![HandlerId::Implementation, HandlerId::Devops]);
    }
}
