//! Handler Identifiers
//!
//! The closed set of task handlers and the descriptor shown when listing
//! them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a concrete task handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerId {
    Implementation,
    Review,
    Debug,
    Documentation,
    Refactoring,
    Security,
    /// Infrastructure and deployment configuration
    Devops,
}

impl HandlerId {
    pub const ALL: [HandlerId; 7] = [
        HandlerId::Implementation,
        HandlerId::Review,
        HandlerId::Debug,
        HandlerId::Documentation,
        HandlerId::Refactoring,
        HandlerId::Security,
        HandlerId::Devops,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerId::Implementation => "implementation",
            HandlerId::Review => "review",
            HandlerId::Debug => "debug",
            HandlerId::Documentation => "documentation",
            HandlerId::Refactoring => "refactoring",
            HandlerId::Security => "security",
            HandlerId::Devops => "devops",
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandlerId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown handler: {}", s))
    }
}

/// Public description of a registered handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    pub name: HandlerId,
    pub description: String,
    pub capabilities: Vec<String>,
    /// Whether the handler can resume after tool results
    pub supports_tools: bool,
}
