//! Handler Outcome
//!
//! The structured result of one handler invocation, including the
//! tool-continuation signals.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use breezer_core::ToolCallRequest;

use super::conversation::ConversationState;

/// A suggested follow-up action the client may offer the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestedAction {
    CreateFile {
        language: String,
        code: String,
        description: String,
    },
    EditFile {
        language: String,
        code: String,
        description: String,
    },
    ApplySuggestion {
        description: String,
    },
    AddLogging {
        description: String,
    },
    AddBreakpoint {
        description: String,
    },
    RunTests {
        description: String,
    },
    ApplyRefactoring {
        code: String,
    },
    CreateDocumentation {
        content: String,
    },
    FixVulnerability {
        description: String,
        priority: Priority,
    },
    CreateConfig {
        config_type: String,
    },
}

/// Priority of a vulnerability fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// Result of a handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub actions: Vec<SuggestedAction>,
    /// Always within [0, 1]
    pub confidence: f64,
    #[serde(default)]
    pub requires_tool: bool,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Present exactly when `requires_tool` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_state: Option<ConversationState>,
}

impl Outcome {
    /// A terminal, successful outcome.
    pub fn success(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            success: true,
            content: content.into(),
            metadata: Map::new(),
            actions: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            requires_tool: false,
            tool_calls: Vec::new(),
            conversation_state: None,
        }
    }

    /// A handler-level failure. Confidence is always zero.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            success: false,
            confidence: 0.0,
            ..Self::success(content, 0.0)
        }
    }

    /// A paused outcome: the caller must execute `tool_calls` and submit the
    /// results to resume `state`.
    pub fn awaiting_tools(
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
        state: ConversationState,
        confidence: f64,
    ) -> Self {
        Self {
            requires_tool: true,
            tool_calls,
            conversation_state: Some(state),
            ..Self::success(content, confidence)
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_actions(mut self, actions: Vec<SuggestedAction>) -> Self {
        self.actions = actions;
        self
    }
}
