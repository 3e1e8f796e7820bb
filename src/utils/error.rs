//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.
//!
//! Only fatal conditions are errors. A handler that cannot do its job returns
//! a failed `Outcome` instead; the variants below mean the request itself is
//! invalid (unknown handler, nothing to resume, no history) or the system is
//! misconfigured.

use thiserror::Error;

use breezer_core::CoreError;
use breezer_llm::LlmError;
use breezer_tools::ToolExecutionError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    // ── Continuation protocol ──────────────────────────────────────────
    /// No handler registered under this id
    #[error("Unknown handler: {0}")]
    UnknownHandler(String),

    /// The handler cannot resume a tool-call conversation
    #[error("Handler '{0}' does not support tool continuation")]
    UnsupportedContinuation(String),

    /// Resumption was attempted with an empty message history
    #[error("Conversation history missing for tool continuation")]
    MissingConversationHistory,

    /// The conversation exceeded the configured number of tool rounds
    #[error("Tool round limit of {limit} reached")]
    TooManyToolRounds { limit: u32 },

    /// No pending tool-call conversation for this request id
    #[error("No pending tool call for request {0}")]
    NoPendingToolCall(String),

    // ── Wrapped crate errors ───────────────────────────────────────────
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolExecutionError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error means "nothing there" rather than "request broken".
    /// Transports map these to a not-found status.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::NoPendingToolCall(_)
                | Self::UnknownHandler(_)
                | Self::Core(CoreError::NotFound(_))
        )
    }
}

/// Convert AppError to a string suitable for command responses
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
