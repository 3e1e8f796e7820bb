//! Infrastructure Handler
//!
//! CI/CD pipelines, containers and deployment configuration.

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::RequestContext;

use super::base::{complete_text, log_interaction, Handler};
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, SuggestedAction};
use crate::services::llm::ModelRouter;

const TEMPERATURE: f32 = 0.3;
const CONFIDENCE: f64 = 0.85;

const SYSTEM_PROMPT: &str = "You are an expert DevOps engineer specialized in:

1. CI/CD Pipelines:
   - GitHub Actions
   - GitLab CI
   - Automated testing and deployment

2. Infrastructure as Code:
   - Docker/Docker Compose
   - Kubernetes
   - Terraform

3. Monitoring & Logging:
   - Prometheus/Grafana
   - Application monitoring
   - Error tracking

4. Best Practices:
   - Immutable infrastructure
   - Blue-green deployments
   - Rollback strategies
   - Security hardening

Always provide:
- Working configuration files
- Security considerations
- Scalability considerations";

/// Kind of configuration a query asks for. Checked in order; the first hit
/// wins.
pub fn infer_config_type(query: &str) -> &'static str {
    let query = query.to_lowercase();
    let rules: [(&[&str], &'static str); 5] = [
        (&["docker"], "docker"),
        (&["kubernetes", "k8s"], "kubernetes"),
        (&["ci", "pipeline"], "ci_cd"),
        (&["terraform"], "terraform"),
        (&["monitoring"], "monitoring"),
    ];
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| query.contains(kw)))
        .map(|(_, config_type)| *config_type)
        .unwrap_or("infrastructure")
}

pub struct DevopsHandler {
    router: Arc<ModelRouter>,
}

impl DevopsHandler {
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    fn build_prompt(context: &RequestContext) -> String {
        let mut parts = vec![
            format!("DevOps Request: {}", context.user_query()),
            format!("\nProject: {}", context.workspace_path()),
        ];

        if let Some(code) = context.selected_code() {
            parts.push(format!("\nExisting configuration:\n```\n{}\n```", code));
        }

        parts.push("\nProvide:".to_string());
        parts.push("- Complete configuration files".to_string());
        parts.push("- Setup instructions".to_string());
        parts.push("- Best practices".to_string());
        parts.push("- Security considerations".to_string());
        parts.join("\n")
    }
}

#[async_trait]
impl Handler for DevopsHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Devops
    }

    fn description(&self) -> &'static str {
        "Builds CI/CD and infrastructure configuration"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["ci_cd", "containers", "infrastructure_as_code"]
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let prompt = Self::build_prompt(context);
        let outcome = match complete_text(&self.router, self.id(), SYSTEM_PROMPT, prompt, TEMPERATURE).await {
            Ok(reply) => {
                let config_type = infer_config_type(context.user_query());
                Outcome::success(reply, CONFIDENCE)
                    .with_metadata("config_type", config_type)
                    .with_actions(vec![SuggestedAction::CreateConfig {
                        config_type: config_type.to_string(),
                    }])
            }
            Err(e) => {
                tracing::error!(error = %e, "Infrastructure handler failed");
                Outcome::failure(format!("DevOps configuration failed: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::ModelSettings;
    use crate::services::llm::mock::MockProvider;
    use std::time::Duration;

    #[test]
    fn test_infer_config_type() {
        assert_eq!(infer_config_type("Write a Dockerfile"), "docker");
        assert_eq!(infer_config_type("deploy to k8s"), "kubernetes");
        assert_eq!(infer_config_type("set up a build pipeline"), "ci_cd");
        assert_eq!(infer_config_type("terraform for s3"), "terraform");
        assert_eq!(infer_config_type("add monitoring"), "monitoring");
        assert_eq!(infer_config_type("provision a vm"), "infrastructure");
    }

    #[tokio::test]
    async fn test_devops_outcome() {
        let provider = Arc::new(MockProvider::with_text("```dockerfile\nFROM rust:1\n```"));
        let handler = DevopsHandler::new(Arc::new(ModelRouter::new(
            provider.clone(),
            ModelSettings::default(),
            Duration::from_secs(5),
        )));
        let ctx = RequestContext::builder("/srv/app", "docker image please")
            .build()
            .unwrap();
        let outcome = handler.process(&ctx).await;

        assert!(outcome.success);
        assert_eq!(outcome.confidence, 0.85);
        assert_eq!(outcome.metadata["config_type"], "docker");
        assert_eq!(
            outcome.actions,
            vec![SuggestedAction::CreateConfig {
                config_type: "docker".to_string()
            }]
        );
        assert!(provider.requests()[0].messages[1]
            .content
            .contains("Project: /srv/app"));
    }
}
