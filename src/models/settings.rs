//! Settings Models
//!
//! Application configuration stored in config.json.

use serde::{Deserialize, Serialize};

use breezer_llm::{ProviderConfig, ProviderType};
use breezer_tools::ToolSettings;

use super::handler::HandlerId;

/// Completion provider connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub provider: ProviderType,
    pub base_url: Option<String>,
    /// Usually supplied through `BREEZER_API_KEY` instead of the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub proxy_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_output_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: ProviderType::DeepSeek,
            base_url: None,
            api_key: None,
            proxy_url: None,
            request_timeout_secs: 120,
            max_output_tokens: 4096,
        }
    }
}

impl ProviderSettings {
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider,
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_output_tokens,
            request_timeout_secs: self.request_timeout_secs,
            proxy_url: self.proxy_url.clone(),
            ..Default::default()
        }
    }
}

/// Model routing table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub implementation: String,
    pub review: String,
    pub debug: String,
    pub documentation: String,
    pub refactoring: String,
    pub security: String,
    pub devops: String,
    /// Retried once when a handler's own model fails
    pub fallback: String,
    /// Phase A of the tool-capable strategy
    pub tool_routing: String,
    /// Phase B of the tool-capable strategy
    pub synthesis: String,
    /// Replaces every model above when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_model: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            implementation: "deepseek-chat".to_string(),
            review: "deepseek-chat".to_string(),
            debug: "deepseek-reasoner".to_string(),
            documentation: "deepseek-chat".to_string(),
            refactoring: "deepseek-chat".to_string(),
            security: "deepseek-chat".to_string(),
            devops: "deepseek-chat".to_string(),
            fallback: "deepseek-chat".to_string(),
            tool_routing: "deepseek-chat".to_string(),
            synthesis: "deepseek-reasoner".to_string(),
            override_model: None,
        }
    }
}

impl ModelSettings {
    fn pick<'a>(&'a self, model: &'a str) -> &'a str {
        self.override_model.as_deref().unwrap_or(model)
    }

    /// Model used by a handler's plain completion.
    pub fn for_handler(&self, handler: HandlerId) -> &str {
        let model = match handler {
            HandlerId::Implementation => &self.implementation,
            HandlerId::Review => &self.review,
            HandlerId::Debug => &self.debug,
            HandlerId::Documentation => &self.documentation,
            HandlerId::Refactoring => &self.refactoring,
            HandlerId::Security => &self.security,
            HandlerId::Devops => &self.devops,
        };
        self.pick(model)
    }

    pub fn fallback(&self) -> &str {
        self.pick(&self.fallback)
    }

    pub fn tool_routing(&self) -> &str {
        self.pick(&self.tool_routing)
    }

    pub fn synthesis(&self) -> &str {
        self.pick(&self.synthesis)
    }

    fn named_ids(&self) -> Vec<(&'static str, &str)> {
        let mut ids = vec![
            ("implementation", self.implementation.as_str()),
            ("review", self.review.as_str()),
            ("debug", self.debug.as_str()),
            ("documentation", self.documentation.as_str()),
            ("refactoring", self.refactoring.as_str()),
            ("security", self.security.as_str()),
            ("devops", self.devops.as_str()),
            ("fallback", self.fallback.as_str()),
            ("tool_routing", self.tool_routing.as_str()),
            ("synthesis", self.synthesis.as_str()),
        ];
        if let Some(model) = &self.override_model {
            ids.push(("override_model", model.as_str()));
        }
        ids
    }

    /// Every configured id must be a non-empty token without whitespace.
    pub fn validate(&self) -> Result<(), String> {
        for (name, id) in self.named_ids() {
            if id.is_empty() {
                return Err(format!("Model id for '{}' is empty", name));
            }
            if id.chars().any(char::is_whitespace) {
                return Err(format!(
                    "Model id for '{}' contains whitespace: '{}'",
                    name, id
                ));
            }
        }
        Ok(())
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub models: ModelSettings,
    /// Lifetime of a paused conversation
    pub tool_state_ttl_secs: u64,
    /// Tool rounds allowed per request before continuation is refused
    pub max_tool_rounds: u32,
    /// Deadline for each completion phase
    pub completion_timeout_secs: u64,
    /// Related examples added to implementation prompts
    pub related_examples_limit: usize,
    pub tools: ToolSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            models: ModelSettings::default(),
            tool_state_ttl_secs: 600,
            max_tool_rounds: 8,
            completion_timeout_secs: 120,
            related_examples_limit: 3,
            tools: ToolSettings::default(),
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.models.validate()?;

        if self.tool_state_ttl_secs == 0 {
            return Err("tool_state_ttl_secs must be at least 1 second".to_string());
        }

        if self.max_tool_rounds == 0 {
            return Err("max_tool_rounds must be at least 1".to_string());
        }

        if self.completion_timeout_secs == 0 {
            return Err("completion_timeout_secs must be at least 1 second".to_string());
        }

        if self.related_examples_limit > 20 {
            return Err("related_examples_limit cannot exceed 20".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.tool_state_ttl_secs, 600);
        assert_eq!(config.max_tool_rounds, 8);
        assert_eq!(config.completion_timeout_secs, 120);
        assert_eq!(config.related_examples_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_phase_models_differ_by_default() {
        let models = ModelSettings::default();
        assert_ne!(models.tool_routing(), models.synthesis());
    }

    #[test]
    fn test_override_model_wins() {
        let models = ModelSettings {
            override_model: Some("local-mistral".to_string()),
            ..Default::default()
        };
        assert_eq!(models.for_handler(HandlerId::Debug), "local-mistral");
        assert_eq!(models.synthesis(), "local-mistral");
        assert_eq!(models.fallback(), "local-mistral");
    }

    #[test]
    fn test_validate_rejects_bad_model_ids() {
        let mut config = AppConfig::default();
        config.models.synthesis = String::new();
        assert!(config.validate().unwrap_err().contains("synthesis"));

        let mut config = AppConfig::default();
        config.models.override_model = Some("deepseek chat".to_string());
        assert!(config.validate().unwrap_err().contains("override_model"));
    }

    #[test]
    fn test_validate_limits() {
        let config = AppConfig {
            max_tool_rounds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            tool_state_ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"max_tool_rounds": 3, "models": {"debug": "gpt-4o"}}"#)
                .unwrap();
        assert_eq!(config.max_tool_rounds, 3);
        assert_eq!(config.models.debug, "gpt-4o");
        assert_eq!(config.models.review, "deepseek-chat");
        assert_eq!(config.tool_state_ttl_secs, 600);
    }
}
