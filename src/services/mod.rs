//! Services
//!
//! Business logic services for the application.
//! Routing, handlers and the tool-continuation protocol live here; the
//! agent service is the caller-facing entry point.

pub mod agent_service;
pub mod conversation_store;
pub mod handlers;
pub mod llm;
pub mod orchestrator;
pub mod search;
pub mod strategy;

pub use agent_service::AgentService;
pub use conversation_store::ConversationStore;
pub use llm::ModelRouter;
pub use orchestrator::Orchestrator;
pub use search::{CodeExample, CodeSearch, NoopCodeSearch};
pub use strategy::ToolCapableStrategy;
