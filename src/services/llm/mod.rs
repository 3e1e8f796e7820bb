//! LLM Services
//!
//! Model routing on top of the completion provider binding from
//! `breezer-llm`.

#[cfg(test)]
pub(crate) mod mock;
pub mod router;

pub use router::ModelRouter;
