//! Completion Provider Trait
//!
//! Defines the common interface for all completion provider bindings.

use async_trait::async_trait;

use super::types::{CompletionRequest, LlmError, LlmResponse, LlmResult};

/// Trait that all completion providers must implement.
///
/// A single binding must support both modes the handlers need:
/// - tool-aware calls (`request.tools` non-empty, `tool_choice` set)
/// - plain calls (no tools)
///
/// The model is part of every request, so callers can route different phases
/// of one conversation to different models through the same binding.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Run one completion and return the normalized reply.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<LlmResponse>;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to map HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        413 => LlmError::ContextLengthExceeded {
            message: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
            retry_after: None,
        },
        400 if body.contains("context_length") || body.contains("maximum context") => {
            LlmError::ContextLengthExceeded {
                message: body.to_string(),
            }
        }
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_error() {
        let err = missing_api_key_error("deepseek");
        match err {
            LlmError::AuthenticationFailed { message } => {
                assert!(message.contains("deepseek"));
            }
            _ => panic!("Expected AuthenticationFailed"),
        }
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_http_error(401, "unauthorized", "openai");
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(429, "rate limited", "openai");
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = parse_http_error(500, "internal error", "openai");
        assert!(matches!(err, LlmError::ServerError { .. }));

        let err = parse_http_error(418, "teapot", "openai");
        assert!(matches!(err, LlmError::Other { .. }));
    }

    #[test]
    fn test_parse_http_error_context_length() {
        let err = parse_http_error(
            400,
            "This model's maximum context length is 65536 tokens",
            "deepseek",
        );
        assert!(matches!(err, LlmError::ContextLengthExceeded { .. }));

        let err = parse_http_error(400, "missing field messages", "deepseek");
        assert!(matches!(err, LlmError::InvalidRequest { .. }));
    }
}
