//! Breezer - Request Routing and Tool-Call Continuation
//!
//! This library routes natural-language coding requests to task handlers
//! and runs the stateful protocol that lets a handler pause for tool
//! execution and resume with the results.
//! It includes:
//! - Request classification and handler routing
//! - Task handlers, including the two-phase tool-capable strategy
//! - The conversation state store and caller-facing agent service
//! - Storage layer (JSON config)
//! - Data models and utilities

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::*;
pub use services::{AgentService, ConversationStore, Orchestrator};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
