//! Response Adapter
//!
//! Each provider binding declares the raw wire type of its completion reply
//! and converts it into the fixed internal [`LlmResponse`]. Handlers only ever
//! see `LlmResponse`; no code downstream of the binding inspects provider
//! shapes.

use serde::de::DeserializeOwned;

use super::types::{LlmError, LlmResponse, LlmResult};

/// Converts a provider's raw reply into an [`LlmResponse`].
pub trait ResponseAdapter: Send + Sync {
    /// The provider's wire format for a non-streaming completion reply.
    type Raw: DeserializeOwned;

    /// Convert a decoded reply.
    fn adapt(&self, raw: Self::Raw) -> LlmResult<LlmResponse>;

    /// Decode a response body and convert it.
    fn parse(&self, body: &str) -> LlmResult<LlmResponse> {
        let raw: Self::Raw = serde_json::from_str(body).map_err(|e| LlmError::ParseError {
            message: format!("Failed to parse response: {}", e),
        })?;
        self.adapt(raw)
    }
}
