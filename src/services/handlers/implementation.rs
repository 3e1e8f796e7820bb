//! Implementation Handler
//!
//! Generates and edits code. The only handler that can pause for tool
//! execution; it drives the two-phase tool-capable strategy.

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::{RequestContext, ToolCallResult};
use breezer_llm::Message;

use super::base::{format_context, log_interaction, Handler};
use crate::models::conversation::ConversationState;
use crate::models::handler::HandlerId;
use crate::models::outcome::Outcome;
use crate::services::search::{CodeExample, CodeSearch};
use crate::services::strategy::ToolCapableStrategy;
use crate::utils::error::{AppError, AppResult};

/// Sampling temperature for both phases.
pub const IMPLEMENTATION_TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are an expert software engineer specialized in writing clean, efficient, and maintainable code.

Your responsibilities:
- Implement features based on requirements
- Write idiomatic code following best practices
- Include necessary imports and dependencies
- Add clear comments for complex logic
- Consider edge cases and error handling
- Generate complete, runnable code

You can inspect the workspace with the provided tools before answering.
Request a tool only when the answer depends on content you have not seen.

Always provide:
1. Complete implementation (not pseudocode)
2. All necessary imports
3. Error handling where appropriate
4. Brief explanation of approach";

pub struct ImplementationHandler {
    strategy: ToolCapableStrategy,
    search: Arc<dyn CodeSearch>,
    related_examples_limit: usize,
}

impl ImplementationHandler {
    pub fn new(
        strategy: ToolCapableStrategy,
        search: Arc<dyn CodeSearch>,
        related_examples_limit: usize,
    ) -> Self {
        Self {
            strategy,
            search,
            related_examples_limit,
        }
    }

    async fn find_related_code(&self, context: &RequestContext) -> Vec<CodeExample> {
        if self.related_examples_limit == 0 {
            return Vec::new();
        }
        match self
            .search
            .search(
                context.user_query(),
                context.workspace_path(),
                self.related_examples_limit,
            )
            .await
        {
            Ok(mut examples) => {
                examples.truncate(self.related_examples_limit);
                examples
            }
            Err(e) => {
                tracing::warn!(error = %e, "Code search failed");
                Vec::new()
            }
        }
    }

    fn build_prompt(context: &RequestContext, related: &[CodeExample]) -> String {
        let mut parts = vec![format_context(context)];

        if !related.is_empty() {
            parts.push("\n\nRelated code examples from your codebase:".to_string());
            for (i, example) in related.iter().enumerate() {
                parts.push(format!(
                    "\nExample {} ({}):\n```{}\n{}\n```",
                    i + 1,
                    example.file_path,
                    example.language,
                    example.content
                ));
            }
        }

        parts.push("\n\nProvide a complete implementation:".to_string());
        parts.join("\n")
    }
}

#[async_trait]
impl Handler for ImplementationHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Implementation
    }

    fn description(&self) -> &'static str {
        "Generates and edits code"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["code_generation", "refactoring", "feature_implementation"]
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let related = self.find_related_code(context).await;
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(Self::build_prompt(context, &related)),
        ];

        let outcome = match self
            .strategy
            .run(self.id(), context, messages, 0, related.len())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Implementation failed");
                Outcome::failure(format!("Failed to generate implementation: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }

    async fn continue_with_tool(
        &self,
        state: ConversationState,
        results: Vec<ToolCallResult>,
    ) -> AppResult<Outcome> {
        let context = state.context.clone();

        let outcome = match self.strategy.resume(state, results).await {
            Ok(outcome) => outcome,
            Err(e @ (AppError::MissingConversationHistory | AppError::TooManyToolRounds { .. })) => {
                return Err(e);
            }
            Err(e) => {
                tracing::error!(error = %e, "Implementation continuation failed");
                Outcome::failure(format!("Failed to generate implementation: {}", e))
            }
        };

        log_interaction(self.id(), &context, &outcome);
        Ok(outcome)
    }
}
