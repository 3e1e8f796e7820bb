//! Review Handler
//!
//! Reviews the selected code and turns lines that mention defects into
//! suggested follow-ups.

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::RequestContext;

use super::base::{complete_text, log_interaction, matching_lines, no_selection, Handler};
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, SuggestedAction};
use crate::services::llm::ModelRouter;

const TEMPERATURE: f32 = 0.4;
const CONFIDENCE: f64 = 0.85;
const MAX_ACTIONS: usize = 5;
const ISSUE_KEYWORDS: [&str; 4] = ["bug", "issue", "problem", "warning"];

const SYSTEM_PROMPT: &str = "You are an expert code reviewer focused on:

1. Code Quality:
   - Readability and maintainability
   - Proper naming conventions
   - Code organization and structure

2. Best Practices:
   - Design patterns
   - SOLID principles
   - DRY (Don't Repeat Yourself)

3. Potential Issues:
   - Bugs and logic errors
   - Performance problems
   - Security vulnerabilities
   - Edge cases not handled

4. Improvements:
   - Refactoring suggestions
   - Optimization opportunities
   - Missing error handling

Provide:
- Clear, actionable feedback
- Severity level (critical, warning, suggestion)
- Specific code examples
- Positive feedback on good practices";

pub struct ReviewHandler {
    router: Arc<ModelRouter>,
}

impl ReviewHandler {
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    fn build_prompt(context: &RequestContext, code: &str) -> String {
        format!(
            "Review the following code:\n\nFile: {}\n\n```\n{}\n```\n\nUser Query: {}\n\n\
             Provide a structured review with:\n\
             1. Overall assessment\n\
             2. Issues found (if any)\n\
             3. Suggestions for improvement\n\
             4. Positive aspects",
            context.current_file().unwrap_or("unknown"),
            code,
            context.user_query()
        )
    }
}

/// Lines of a review that mention an issue keyword.
pub fn parse_issues(review: &str) -> Vec<String> {
    matching_lines(review, |line| {
        let lower = line.to_lowercase();
        ISSUE_KEYWORDS.iter().any(|kw| lower.contains(kw))
    })
}

#[async_trait]
impl Handler for ReviewHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Review
    }

    fn description(&self) -> &'static str {
        "Reviews code for quality and issues"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["code_review", "best_practices", "bug_detection"]
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let Some(code) = context.selected_code() else {
            let outcome = no_selection("review");
            log_interaction(self.id(), context, &outcome);
            return outcome;
        };

        let prompt = Self::build_prompt(context, code);
        let outcome = match complete_text(&self.router, self.id(), SYSTEM_PROMPT, prompt, TEMPERATURE).await {
            Ok(review) => {
                let issues = parse_issues(&review);
                let actions = issues
                    .iter()
                    .take(MAX_ACTIONS)
                    .map(|issue| SuggestedAction::ApplySuggestion {
                        description: issue.clone(),
                    })
                    .collect();
                Outcome::success(review, CONFIDENCE)
                    .with_metadata("issues_found", issues.len())
                    .with_metadata("code_length", code.chars().count())
                    .with_actions(actions)
            }
            Err(e) => {
                tracing::error!(error = %e, "Review failed");
                Outcome::failure(format!("Review failed: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }
}
