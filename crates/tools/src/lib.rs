//! Breezer Tools
//!
//! The fixed tool catalog offered to the model and the service that executes
//! those tools on behalf of a caller:
//! - `definitions` - the eight tool definitions and their fail-fast validation
//! - `executor` - `ToolExecutionService`, scoped to one workspace root
//!
//! The orchestrator never executes tools itself. It surfaces tool calls to the
//! caller, who may run them through `ToolExecutionService` and submit the
//! results back.

pub mod definitions;
pub mod executor;

pub use definitions::{get_tool_definitions, validate_tool_definitions};
pub use executor::{ToolExecutionError, ToolExecutionService, ToolSettings};
