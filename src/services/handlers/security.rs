//! Security Handler
//!
//! Audits the selected code. Findings are the reply lines that carry a
//! severity marker; the highest marker seen becomes the overall severity.

use std::sync::Arc;

use async_trait::async_trait;

use breezer_core::RequestContext;

use super::base::{complete_text, log_interaction, matching_lines, no_selection, Handler};
use crate::models::handler::HandlerId;
use crate::models::outcome::{Outcome, Priority, SuggestedAction};
use crate::services::llm::ModelRouter;

const TEMPERATURE: f32 = 0.2;
const CONFIDENCE: f64 = 0.9;
const MAX_ACTIONS: usize = 10;

/// Severity markers, highest first.
const SEVERITIES: [&str; 4] = ["CRITICAL", "HIGH", "MEDIUM", "LOW"];

const SYSTEM_PROMPT: &str = "You are an expert security auditor specialized in:

1. Vulnerability Detection:
   - SQL injection
   - XSS (Cross-Site Scripting)
   - CSRF
   - Authentication/Authorization flaws
   - Insecure dependencies

2. Security Best Practices:
   - Input validation
   - Output encoding
   - Secure authentication
   - Encryption and hashing
   - Secrets management

3. OWASP Top 10:
   - Broken access control
   - Cryptographic failures
   - Injection vulnerabilities
   - Insecure design
   - Security misconfiguration

Always:
- Identify specific vulnerabilities
- Provide severity ratings
- Suggest concrete fixes
- Explain security implications";

/// Reply lines that mention a severity marker or the word vulnerability.
pub fn parse_vulnerabilities(audit: &str) -> Vec<String> {
    matching_lines(audit, |line| {
        let upper = line.to_uppercase();
        SEVERITIES.iter().any(|s| upper.contains(s)) || upper.contains("VULNERABILITY")
    })
}

/// Highest severity mentioned across findings; `NONE` when there are none.
pub fn max_severity(findings: &[String]) -> &'static str {
    if findings.is_empty() {
        return "NONE";
    }
    SEVERITIES[..3]
        .iter()
        .find(|severity| findings.iter().any(|f| f.to_uppercase().contains(*severity)))
        .copied()
        .unwrap_or("LOW")
}

fn priority_for(finding: &str) -> Priority {
    let upper = finding.to_uppercase();
    if upper.contains("CRITICAL") || upper.contains("HIGH") {
        Priority::High
    } else {
        Priority::Medium
    }
}

pub struct SecurityHandler {
    router: Arc<ModelRouter>,
}

impl SecurityHandler {
    pub fn new(router: Arc<ModelRouter>) -> Self {
        Self { router }
    }

    fn build_prompt(context: &RequestContext, code: &str) -> String {
        format!(
            "Perform a security audit on the following code:\n\nFile: {}\n\nCode:\n```\n{}\n```\n\n\
             User Request: {}\n\n\
             Analyze for:\n\
             1. Common vulnerabilities (OWASP Top 10)\n\
             2. Insecure patterns\n\
             3. Data exposure risks\n\
             4. Authentication/authorization issues\n\
             5. Injection vulnerabilities\n\n\
             Provide:\n\
             - List of vulnerabilities (with severity: CRITICAL, HIGH, MEDIUM, LOW)\n\
             - Explanation of each issue\n\
             - Recommended fixes",
            context.current_file().unwrap_or("unknown"),
            code,
            context.user_query()
        )
    }
}

#[async_trait]
impl Handler for SecurityHandler {
    fn id(&self) -> HandlerId {
        HandlerId::Security
    }

    fn description(&self) -> &'static str {
        "Audits code for security vulnerabilities"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["vulnerability_detection", "owasp_audit", "secure_coding"]
    }

    async fn process(&self, context: &RequestContext) -> Outcome {
        let Some(code) = context.selected_code() else {
            let outcome = no_selection("security audit");
            log_interaction(self.id(), context, &outcome);
            return outcome;
        };

        let prompt = Self::build_prompt(context, code);
        let outcome = match complete_text(&self.router, self.id(), SYSTEM_PROMPT, prompt, TEMPERATURE).await {
            Ok(audit) => {
                let findings = parse_vulnerabilities(&audit);
                let severity = max_severity(&findings);
                let actions = findings
                    .iter()
                    .take(MAX_ACTIONS)
                    .map(|finding| SuggestedAction::FixVulnerability {
                        description: finding.clone(),
                        priority: priority_for(finding),
                    })
                    .collect();
                Outcome::success(audit, CONFIDENCE)
                    .with_metadata("vulnerabilities_found", findings.len())
                    .with_metadata("severity", severity)
                    .with_actions(actions)
            }
            Err(e) => {
                tracing::error!(error = %e, "Security audit failed");
                Outcome::failure(format!("Security audit failed: {}", e))
            }
        };

        log_interaction(self.id(), context, &outcome);
        outcome
    }
}
