//! Refactoring Handler

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::RequestContext;

use super::base::{complete_text, log_interaction, no_selection, Handler};
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, SuggestedAction};
use crate::services::llm::ModelRouter;

const TEMPERATURE: f32 = 0.2;
const CONFIDENCE: f64 = 0.85;

const SYSTEM_PROMPT: &str = "You are an expert code refactoring specialist focused on:

1. Code Quality Improvements:
   - Extract methods/functions
   - Reduce complexity
   - Eliminate duplication (DRY)
   - Improve naming

2. Design Patterns:
   - Apply appropriate patterns
   - SOLID principles
   - Clean architecture

3. Performance:
   - Optimize algorithms
   - Reduce memory usage
   - Improve efficiency

4. Maintainability:
   - Simplify logic
   - Improve readability
   - Better structure

Refactoring Principles:
- Preserve behavior (no functional changes)
- Make incremental changes
- Maintain or improve tests
- Document significant changes";

pub struct RefactoringHandler {
    router: Arc<ModelRouter>,
}

impl RefactoringHandler {
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    fn build_prompt(context: &RequestContext, code: &str) -> String {
        format!(
            "Refactor the following code:\n\nFile: {}\n\nOriginal Code:\n```\n{}\n```\n\n\
             User Request: {}\n\n\
             Provide:\n\
             1. Refactored code\n\
             2. Explanation of changes\n\
             3. Benefits of refactoring\n\
             4. Any trade-offs",
            context.current_file().unwrap_or("unknown"),
            code,
            context.user_query()
        )
    }
}

#[async_trait]
impl Handler for RefactoringHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Refactoring
    }

    fn description(&self) -> &'static str {
        "Restructures code without changing behavior"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["refactoring", "complexity_reduction", "performance_optimization"]
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let Some(code) = context.selected_code() else {
            let outcome = no_selection("refactoring");
            log_interaction(self.id(), context, &outcome);
            return outcome;
        };

        let prompt = Self::build_prompt(context, code);
        let outcome = match complete_text(&self.router, self.id(), SYSTEM_PROMPT, prompt, TEMPERATURE).await {
            Ok(refactored) => Outcome::success(refactored.as_str(), CONFIDENCE)
                .with_metadata("original_length", code.chars().count())
                .with_metadata("refactored_length", refactored.chars().count())
                .with_actions(vec![SuggestedAction::ApplyRefactoring { code: refactored }]),
            Err(e) => {
                tracing::error!(error = %e, "Refactoring failed");
                Outcome::failure(format!("Refactoring failed: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }
}
