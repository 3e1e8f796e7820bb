//! Request Strategy
//!
//! Request classification and the tool-capable completion protocol.

pub mod classifier;
pub mod completion;

pub use classifier::{classify, RequestType};
pub use completion::{code_actions, extract_code_blocks, CodeBlock, ToolCapableStrategy};
