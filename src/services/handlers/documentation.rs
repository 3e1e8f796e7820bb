//! Documentation Handler

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::RequestContext;

use super::base::{complete_text, log_interaction, Handler};
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, SuggestedAction};
use crate::services::llm::ModelRouter;

const TEMPERATURE: f32 = 0.3;
const CONFIDENCE: f64 = 0.9;

const SYSTEM_PROMPT: &str = "You are an expert technical writer specialized in:

1. Code Documentation:
   - Clear docstrings and doc comments
   - Inline comments for complex logic
   - README files
   - API documentation

2. Architecture Documentation:
   - System design documents
   - Architecture Decision Records (ADRs)
   - Component diagrams (Mermaid)

3. User Documentation:
   - Setup guides
   - Usage examples
   - Troubleshooting guides

Best Practices:
- Write for the intended audience
- Use clear, concise language
- Include code examples
- Use proper formatting (Markdown)";

/// Kind of documentation a query asks for.
pub fn infer_doc_type(query: &str) -> &'static str {
    let query = query.to_lowercase();
    if query.contains("readme") {
        "readme"
    } else if query.contains("api") {
        "api"
    } else if query.contains("docstring") {
        "docstring"
    } else {
        "general"
    }
}

pub struct DocumentationHandler {
    router: Arc<ModelRouter>,
}

impl DocumentationHandler {
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    fn build_prompt(context: &RequestContext) -> String {
        let mut parts = vec![format!("Documentation Request: {}", context.user_query())];

        if let Some(code) = context.selected_code() {
            parts.push(format!("\nCode to document:\n```\n{}\n```", code));
        }
        if let Some(file) = context.current_file() {
            parts.push(format!("\nFile: {}", file));
        }

        parts.push("\nGenerate comprehensive documentation with:".to_string());
        parts.push("- Clear descriptions".to_string());
        parts.push("- Parameter/return value documentation".to_string());
        parts.push("- Usage examples".to_string());
        parts.push("- Proper formatting".to_string());
        parts.join("\n")
    }
}

#[async_trait]
impl Handler for DocumentationHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Documentation
    }

    fn description(&self) -> &'static str {
        "Generates and maintains documentation"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["docstrings", "readme", "api_docs"]
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let prompt = Self::build_prompt(context);
        let outcome = match complete_text(&self.router, self.id(), SYSTEM_PROMPT, prompt, TEMPERATURE).await {
            Ok(doc) => Outcome::success(doc.as_str(), CONFIDENCE)
                .with_metadata("doc_type", infer_doc_type(context.user_query()))
                .with_actions(vec![SuggestedAction::CreateDocumentation { content: doc }]),
            Err(e) => {
                tracing::error!(error = %e, "Documentation failed");
                Outcome::failure(format!("Documentation generation failed: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }
}
