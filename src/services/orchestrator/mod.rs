//! Request Orchestration
//!
//! Routes classified requests to task handlers and forwards tool
//! continuations.

mod service;

pub use service::{route, Orchestrator};
