//! Agent Service
//!
//! Caller-facing entry points. Assigns request ids, keeps paused
//! conversations in the store between a tool request and the submission of
//! its results, and converts outcomes into responses.
//!
//! Store discipline: after every query or continuation, the entry for the
//! request id holds the new state when the outcome asks for tools and is
//! cleared otherwise. Resumption claims the entry with `pop`, so a duplicate
//! submission for the same request finds nothing.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::handler::HandlerId;
use crate::models::outcome::Outcome;
use crate::models::response::{
    HandlerListResponse, HandlerStepResponse, MultiAgentResponse, QueryRequest, QueryResponse,
    ToolResultRequest,
};
use crate::services::conversation_store::ConversationStore;
use crate::services::orchestrator::Orchestrator;
use crate::utils::error::{AppError, AppResult};

pub struct AgentService {
    orchestrator: Arc<Orchestrator>,
    store: Arc<ConversationStore>,
}

impl AgentService {
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    /// Process a new request.
    pub async fn submit_query(&self, request: QueryRequest) -> AppResult<QueryResponse> {
        let context = request.to_context()?;
        let request_id = Uuid::new_v4().to_string();
        tracing::info!(request_id = %request_id, "Received query");

        let outcome = self.orchestrator.process(&context).await;
        self.record(request_id, outcome).await
    }

    /// Resume a paused request with the caller's tool results.
    pub async fn submit_tool_results(&self, request: ToolResultRequest) -> AppResult<QueryResponse> {
        let ToolResultRequest {
            request_id,
            tool_results,
        } = request;

        let state = self
            .store
            .pop(&request_id)
            .await
            .ok_or_else(|| AppError::NoPendingToolCall(request_id.clone()))?;

        tracing::info!(
            request_id = %request_id,
            handler = %state.handler,
            results = tool_results.len(),
            "Resuming request"
        );

        let handler = state.handler;
        let outcome = self
            .orchestrator
            .continue_with_tool(handler.as_str(), state, tool_results)
            .await?;
        self.record(request_id, outcome).await
    }

    /// Run several handlers in sequence on one request. Paused outcomes in a
    /// sequence are reported but not kept for resumption.
    pub async fn submit_multi_agent(
        &self,
        request: QueryRequest,
        sequence: &[String],
    ) -> AppResult<MultiAgentResponse> {
        let context = request.to_context()?;
        let request_id = Uuid::new_v4().to_string();

        let steps = self.orchestrator.process_multi_agent(&context, sequence).await;
        let handlers_used: Vec<HandlerId> = steps.iter().map(|(id, _)| *id).collect();
        let responses = steps
            .into_iter()
            .map(|(handler, outcome)| HandlerStepResponse {
                handler,
                success: outcome.success,
                content: outcome.content,
                metadata: outcome.metadata,
                confidence: outcome.confidence,
            })
            .collect();

        Ok(MultiAgentResponse {
            request_id,
            handlers_used,
            responses,
        })
    }

    pub fn list_handlers(&self) -> HandlerListResponse {
        HandlerListResponse {
            handlers: self.orchestrator.handlers(),
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    async fn record(&self, request_id: String, mut outcome: Outcome) -> AppResult<QueryResponse> {
        match (outcome.requires_tool, outcome.conversation_state.take()) {
            (true, Some(state)) => {
                tracing::debug!(
                    request_id = %request_id,
                    tool_calls = outcome.tool_calls.len(),
                    "Awaiting tool results"
                );
                self.store.set(&request_id, state).await;
            }
            (true, None) => {
                self.store.clear(&request_id).await;
                return Err(AppError::internal(
                    "Outcome requires tools but carries no conversation state",
                ));
            }
            (false, _) => self.store.clear(&request_id).await,
        }
        Ok(QueryResponse::from_outcome(request_id, outcome))
    }
}

// ============================================================================
// Tests
// ============================================================================
