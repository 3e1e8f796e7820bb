//! Conversation State
//!
//! Everything needed to resume a handler invocation that paused for tool
//! execution.

use serde::{Deserialize, Serialize};

use breezer_core::RequestContext;
use breezer_llm::Message;

use super::handler::HandlerId;

/// A paused multi-turn exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Full ordered history sent to and received from the model
    pub messages: Vec<Message>,
    /// Handler that produced the paused outcome
    pub handler: HandlerId,
    /// Copy of the original request
    pub context: RequestContext,
    /// Tool rounds completed so far
    #[serde(default)]
    pub tool_rounds: u32,
}

impl ConversationState {
    pub fn new(handler: HandlerId, context: RequestContext, messages: Vec<Message>) -> Self {
        Self {
            messages,
            handler,
            context,
            tool_rounds: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last message in the history, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
