//! Breezer LLM
//!
//! Provides a unified interface for chat-completion providers:
//! - `CompletionProvider` trait with per-call model selection
//! - `ResponseAdapter` trait converting a provider's wire format into the
//!   fixed internal `LlmResponse`
//! - `OpenAiCompatibleProvider` for OpenAI, DeepSeek and llamafile-style
//!   servers that speak the `/chat/completions` protocol
//!
//! Also includes the HTTP client factory.

pub mod adapter;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use adapter::ResponseAdapter;
pub use http_client::build_http_client;
pub use openai::{OpenAiAdapter, OpenAiCompatibleProvider};
pub use provider::CompletionProvider;
pub use types::*;
