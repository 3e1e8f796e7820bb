//! Handler Contract
//!
//! Every task handler turns a `RequestContext` into an `Outcome`. Failures
//! inside `process` are folded into a failure outcome; only protocol
//! violations on the continuation path surface as `AppError`.

use async_trait::async_trait;
use serde_json::Value;

use breezer_core::{RequestContext, ToolCallResult};
use breezer_llm::Message;

use crate::models::conversation::ConversationState;
use crate::models::handler::{HandlerDescriptor, HandlerId};
use crate::models::outcome::Outcome;
use crate::services::llm::ModelRouter;
use crate::utils::error::{AppError, AppResult};

/// Characters of the query kept in interaction log records.
const LOG_QUERY_CHARS: usize = 100;

#[async_trait]
pub trait Handler: Send + Sync {
    fn id(&self) -> HandlerId;

    fn description(&self) -> &'static str;

    fn capabilities(&self) -> &'static [&'static str];

    /// Whether `continue_with_tool` is implemented.
    fn supports_tools(&self) -> bool {
        false
    }

    fn descriptor(&self) -> HandlerDescriptor {
        HandlerDescriptor {
            name: self.id(),
            description: self.description().to_string(),
            capabilities: self.capabilities().iter().map(|c| c.to_string()).collect(),
            supports_tools: self.supports_tools(),
        }
    }

    async fn process(&self, context: &RequestContext) -> Outcome;

    /// Resume a paused exchange. Handlers that never pause reject this.
    async fn continue_with_tool(
        &self,
        _state: ConversationState,
        _results: Vec<ToolCallResult>,
    ) -> AppResult<Outcome> {
        Err(AppError::UnsupportedContinuation(self.id().to_string()))
    }
}

/// Render the request for a model prompt.
pub fn format_context(context: &RequestContext) -> String {
    let mut parts = vec![format!("User Query: {}", context.user_query())];

    if let Some(file) = context.current_file() {
        parts.push(format!("\nCurrent File: {}", file));
    }
    if let Some(code) = context.selected_code() {
        parts.push(format!("\nSelected Code:\n```\n{}\n```", code));
    }
    if !context.open_files().is_empty() {
        parts.push(format!("\nOpen Files: {}", context.open_files().join(", ")));
    }
    if !context.additional_context().is_empty() {
        parts.push("\nAdditional Context:".to_string());
        for (key, value) in context.additional_context() {
            match value {
                Value::String(s) => parts.push(format!("{}: {}", key, s)),
                other => parts.push(format!("{}: {}", key, other)),
            }
        }
    }

    parts.join("\n")
}

/// Emit the per-invocation record.
pub fn log_interaction(handler: HandlerId, context: &RequestContext, outcome: &Outcome) {
    tracing::info!(
        handler = %handler,
        query = context.query_prefix(LOG_QUERY_CHARS),
        success = outcome.success,
        confidence = outcome.confidence,
        requires_tool = outcome.requires_tool,
        "Processed query"
    );
}

/// One plain completion on the handler's model: system prompt plus one user
/// turn.
pub(crate) async fn complete_text(
    router: &ModelRouter,
    handler: HandlerId,
    system_prompt: &str,
    user_prompt: String,
    temperature: f32,
) -> AppResult<String> {
    let messages = vec![Message::system(system_prompt), Message::user(user_prompt)];
    let response = router.complete_for(handler, messages, temperature).await?;
    Ok(response.content_text().to_string())
}

/// Trimmed lines of `text` for which `pred` holds.
pub(crate) fn matching_lines(text: &str, pred: impl Fn(&str) -> bool) -> Vec<String> {
    text.lines()
        .filter(|line| pred(line))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Failure outcome for handlers that need a code selection.
pub(crate) fn no_selection(what: &str) -> Outcome {
    Outcome::failure(format!("No code selected for {}", what))
}
