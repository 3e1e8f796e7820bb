//! Request / Response Types
//!
//! Shapes exchanged with the caller-facing surface. The transport itself is
//! not part of this crate; these types are what it would serialize.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use breezer_core::{CoreResult, RequestContext, ToolCallRequest, ToolCallResult};

use super::handler::{HandlerDescriptor, HandlerId};
use super::outcome::{Outcome, SuggestedAction};

/// A new natural-language request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub workspace_path: String,
    #[serde(default)]
    pub current_file: Option<String>,
    #[serde(default)]
    pub selected_code: Option<String>,
    #[serde(default)]
    pub open_files: Vec<String>,
    #[serde(default)]
    pub additional_context: Map<String, Value>,
}

impl QueryRequest {
    pub fn new(workspace_path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            workspace_path: workspace_path.into(),
            ..Default::default()
        }
    }

    /// Build the immutable request context.
    pub fn to_context(&self) -> CoreResult<RequestContext> {
        let mut builder = RequestContext::builder(&self.workspace_path, &self.query)
            .open_files(self.open_files.clone())
            .additional_context(self.additional_context.clone());
        if let Some(file) = &self.current_file {
            builder = builder.current_file(file);
        }
        if let Some(code) = &self.selected_code {
            builder = builder.selected_code(code);
        }
        builder.build()
    }
}

/// Tool results for a paused request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultRequest {
    pub request_id: String,
    pub tool_results: Vec<ToolCallResult>,
}

/// Outcome as seen by the caller. The conversation state never leaves the
/// process; the caller only keeps `request_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub request_id: String,
    pub success: bool,
    pub content: String,
    pub metadata: Map<String, Value>,
    pub actions: Vec<SuggestedAction>,
    pub confidence: f64,
    pub requires_tool: bool,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl QueryResponse {
    pub fn from_outcome(request_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            request_id: request_id.into(),
            success: outcome.success,
            content: outcome.content,
            metadata: outcome.metadata,
            actions: outcome.actions,
            confidence: outcome.confidence,
            requires_tool: outcome.requires_tool,
            tool_calls: outcome.tool_calls,
        }
    }
}

/// One step of a multi-handler run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerStepResponse {
    pub handler: HandlerId,
    pub success: bool,
    pub content: String,
    pub metadata: Map<String, Value>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiAgentResponse {
    pub request_id: String,
    pub handlers_used: Vec<HandlerId>,
    pub responses: Vec<HandlerStepResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerListResponse {
    pub handlers: Vec<HandlerDescriptor>,
}
