//! Tool-Capable Completion Strategy
//!
//! Two-phase completion for handlers that can pause for tool execution.
//!
//! Phase A offers the full tool catalog to the tool-routing model. If that
//! model asks for tools, the exchange pauses: the caller receives the calls
//! and a `ConversationState` ending with the assistant turn that issued them.
//! Otherwise Phase B asks the synthesis model for the final answer over the
//! original messages, discarding the Phase A reply.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::json;

use breezer_core::{RequestContext, ToolCallResult};
use breezer_llm::{CompletionRequest, Message, ToolChoice, ToolDefinition};

use crate::models::conversation::ConversationState;
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, SuggestedAction};
use crate::services::llm::ModelRouter;
use crate::utils::error::{AppError, AppResult};

/// Confidence reported when the reply contains at least one code block.
const CODE_CONFIDENCE: f64 = 0.9;
/// Confidence reported for prose-only replies and paused exchanges.
const PROSE_CONFIDENCE: f64 = 0.5;

/// A fenced code block pulled out of a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

fn code_block_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)```(\w+)?\n(.*?)```").ok())
        .as_ref()
}

/// Extract fenced code blocks in order of appearance. A block without a
/// language tag is reported as `unknown`.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let Some(pattern) = code_block_pattern() else {
        return Vec::new();
    };
    pattern
        .captures_iter(text)
        .map(|caps| CodeBlock {
            language: caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            code: caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// First block suggests a new file; later blocks suggest edits.
pub fn code_actions(blocks: &[CodeBlock]) -> Vec<SuggestedAction> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let language = block.language.clone();
            let code = block.code.clone();
            let description = format!("Apply {} code", block.language);
            if i == 0 {
                SuggestedAction::CreateFile {
                    language,
                    code,
                    description,
                }
            } else {
                SuggestedAction::EditFile {
                    language,
                    code,
                    description,
                }
            }
        })
        .collect()
}

/// Runs the Phase A / Phase B protocol for one handler.
pub struct ToolCapableStrategy {
    router: Arc<ModelRouter>,
    tools: Vec<ToolDefinition>,
    temperature: f32,
    max_tool_rounds: u32,
}

impl ToolCapableStrategy {
    pub fn new(
        router: Arc<ModelRouter>,
        tools: Vec<ToolDefinition>,
        temperature: f32,
        max_tool_rounds: u32,
    ) -> Self {
        Self {
            router,
            tools,
            temperature,
            max_tool_rounds,
        }
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    /// Run one round starting at Phase A.
    ///
    /// `tool_rounds` is the number of rounds already completed for this
    /// exchange and is carried into any paused state.
    pub async fn run(
        &self,
        handler: HandlerId,
        context: &RequestContext,
        messages: Vec<Message>,
        tool_rounds: u32,
        related_examples: usize,
    ) -> AppResult<Outcome> {
        let models = self.router.models();
        let tool_model = models.tool_routing().to_string();

        // ── Phase A ──
        let request = CompletionRequest::new(messages.clone(), tool_model.as_str(), self.temperature)
            .with_tools(self.tools.clone(), ToolChoice::Auto);
        let response = self.router.complete(request).await?;

        if response.has_tool_calls() {
            tracing::info!(
                handler = %handler,
                model = %tool_model,
                tool_calls = response.tool_calls.len(),
                tool_rounds,
                "Model requested tools"
            );

            let mut history = messages;
            history.push(response.to_assistant_message());
            let mut state = ConversationState::new(handler, context.clone(), history);
            state.tool_rounds = tool_rounds;

            let outcome = Outcome::awaiting_tools(
                response.content_text(),
                response.tool_calls.clone(),
                state,
                PROSE_CONFIDENCE,
            )
            .with_metadata("related_examples", related_examples)
            .with_metadata("models_used", json!({ "tool_phase": tool_model }))
            .with_metadata("tool_rounds", tool_rounds);
            return Ok(outcome);
        }

        // ── Phase B ──
        let final_model = models.synthesis().to_string();
        let request = CompletionRequest::new(messages, final_model.as_str(), self.temperature);
        let response = self.router.complete(request).await?;
        let content = response.content_text().to_string();

        let blocks = extract_code_blocks(&content);
        let confidence = if blocks.is_empty() {
            PROSE_CONFIDENCE
        } else {
            CODE_CONFIDENCE
        };
        let actions = code_actions(&blocks);

        Ok(Outcome::success(content, confidence)
            .with_actions(actions)
            .with_metadata("code_blocks", blocks.len())
            .with_metadata("related_examples", related_examples)
            .with_metadata(
                "models_used",
                json!({ "tool_phase": tool_model, "final": final_model }),
            )
            .with_metadata("tool_rounds", tool_rounds))
    }

    /// Resume a paused exchange with the caller's tool results.
    ///
    /// Results are appended as tool turns in submission order, then the
    /// protocol restarts at Phase A on the augmented history.
    pub async fn resume(
        &self,
        state: ConversationState,
        results: Vec<ToolCallResult>,
    ) -> AppResult<Outcome> {
        if state.is_empty() {
            return Err(AppError::MissingConversationHistory);
        }
        if state.tool_rounds >= self.max_tool_rounds {
            return Err(AppError::TooManyToolRounds {
                limit: self.max_tool_rounds,
            });
        }

        let ConversationState {
            mut messages,
            handler,
            context,
            tool_rounds,
        } = state;

        messages.extend(
            results
                .into_iter()
                .map(|r| Message::tool_result(r.call_id, r.name, r.output)),
        );

        // Related examples are only looked up on the first round.
        self.run(handler, &context, messages, tool_rounds + 1, 0).await
    }
}

// ============================================================================
// Tests
// ============================================================================
