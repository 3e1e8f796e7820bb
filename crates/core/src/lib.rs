//! Breezer Core
//!
//! Foundational types shared by every crate in the Breezer workspace. This
//! crate has no dependencies on provider bindings, tool execution or the
//! application crate.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `context` - Per-request input (`RequestContext`, `RequestContextBuilder`)
//! - `tool_call` - Model-issued tool call requests and caller-supplied results
//!
//! ## Design Principles
//!
//! 1. **Only serde/thiserror** - keeps the crate cheap to depend on
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod context;
pub mod error;
pub mod tool_call;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Request Context ────────────────────────────────────────────────────
pub use context::{RequestContext, RequestContextBuilder};

// ── Tool Calls ─────────────────────────────────────────────────────────
pub use tool_call::{ToolCallRequest, ToolCallResult};
