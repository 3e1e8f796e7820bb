//! Tool Call Records
//!
//! A `ToolCallRequest` is what the model asks for; a `ToolCallResult` is what
//! the external tool-execution collaborator hands back. They pair by call id.
//! A result whose id matches no pending request is still forwarded to the
//! model, which may ignore it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call requested by the model, surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique ID for this tool call (assigned by the model provider)
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments as presented by the model
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Output of an executed tool call, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// ID of the request this result answers
    pub call_id: String,
    /// Name of the tool that produced the output
    pub name: String,
    /// Output text (or error text) of the execution
    pub output: String,
}

impl ToolCallResult {
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            output: output.into(),
        }
    }
}
