//! Task Handlers
//!
//! One handler per `HandlerId`. Only the implementation handler supports
//! tool continuation.

pub mod base;
pub mod debug;
pub mod devops;
pub mod documentation;
pub mod implementation;
pub mod refactoring;
pub mod review;
pub mod security;

pub use base::{format_context, log_interaction, Handler};
pub use debug::DebugHandler;
pub use devops::DevopsHandler;
pub use documentation::DocumentationHandler;
pub use implementation::{ImplementationHandler, IMPLEMENTATION_TEMPERATURE};
pub use refactoring::RefactoringHandler;
pub use review::ReviewHandler;
pub use security::SecurityHandler;
