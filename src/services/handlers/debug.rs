//! Debug Handler
//!
//! Root-cause analysis from the query, the selected code and any error
//! message or stack trace the caller attached.

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::RequestContext;

use super::base::{complete_text, log_interaction, Handler};
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, SuggestedAction};
use crate::services::llm::ModelRouter;

const TEMPERATURE: f32 = 0.3;
const CONFIDENCE: f64 = 0.8;

/// Additional-context keys read by this handler.
pub const ERROR_MESSAGE_KEY: &str = "error_message";
pub const STACK_TRACE_KEY: &str = "stack_trace";

const SYSTEM_PROMPT: &str = "You are an expert debugger specialized in:

1. Error Analysis:
   - Parse stack traces
   - Identify root causes
   - Explain error messages

2. Debugging Strategies:
   - Add logging statements
   - Test hypotheses
   - Isolate problems

3. Solutions:
   - Provide fixes
   - Suggest preventive measures
   - Explain why errors occur

Always:
- Analyze the full error context
- Suggest multiple solutions if applicable
- Explain the debugging process
- Recommend testing approaches";

pub struct DebugHandler {
    router: Arc<ModelRouter>,
}

impl DebugHandler {
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    fn build_prompt(context: &RequestContext) -> String {
        let mut parts = vec![format!("Debug Request: {}", context.user_query())];

        if let Some(code) = context.selected_code() {
            parts.push(format!("\nCode to debug:\n```\n{}\n```", code));
        }
        if let Some(message) = context.additional_str(ERROR_MESSAGE_KEY) {
            parts.push(format!("\nError Message:\n{}", message));
        }
        if let Some(trace) = context.additional_str(STACK_TRACE_KEY) {
            parts.push(format!("\nStack Trace:\n{}", trace));
        }

        parts.push("\nProvide:".to_string());
        parts.push("1. Root cause analysis".to_string());
        parts.push("2. Step-by-step debugging approach".to_string());
        parts.push("3. Recommended fixes".to_string());
        parts.push("4. Prevention strategies".to_string());
        parts.join("\n")
    }

    fn debug_actions() -> Vec<SuggestedAction> {
        vec![
            SuggestedAction::AddLogging {
                description: "Add debug logging".to_string(),
            },
            SuggestedAction::AddBreakpoint {
                description: "Set breakpoint".to_string(),
            },
            SuggestedAction::RunTests {
                description: "Run related tests".to_string(),
            },
        ]
    }
}

#[async_trait]
impl Handler for DebugHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Debug
    }

    fn description(&self) -> &'static str {
        "Debugs and troubleshoots code"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["error_analysis", "debugging", "root_cause_analysis"]
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let prompt = Self::build_prompt(context);
        let outcome = match complete_text(&self.router, self.id(), SYSTEM_PROMPT, prompt, TEMPERATURE).await {
            Ok(analysis) => Outcome::success(analysis, CONFIDENCE)
                .with_metadata(
                    "has_error_message",
                    context.additional_str(ERROR_MESSAGE_KEY).is_some(),
                )
                .with_metadata(
                    "has_stack_trace",
                    context.additional_str(STACK_TRACE_KEY).is_some(),
                )
                .with_actions(Self::debug_actions()),
            Err(e) => {
                tracing::error!(error = %e, "Debug failed");
                Outcome::failure(format!("Debug analysis failed: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }
}
