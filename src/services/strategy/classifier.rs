//! Request Classifier
//!
//! Maps a free-text query to a request type with an ordered keyword table.
//! Matching is a case-insensitive substring test; the first group with any
//! hit wins, so a query mentioning both "review" and "bug" is a review.

use serde::{Deserialize, Serialize};

/// Request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Implement,
    Review,
    Debug,
    Refactor,
    Explain,
    Unknown,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Implement => write!(f, "implement"),
            RequestType::Review => write!(f, "review"),
            RequestType::Debug => write!(f, "debug"),
            RequestType::Refactor => write!(f, "refactor"),
            RequestType::Explain => write!(f, "explain"),
            RequestType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Keyword groups in priority order.
const RULES: &[(RequestType, &[&str])] = &[
    (
        RequestType::Implement,
        &["create", "implement", "build", "add", "write", "generate", "make", "develop"],
    ),
    (
        RequestType::Review,
        &["review", "check", "analyze", "improve", "suggest", "feedback", "quality"],
    ),
    (
        RequestType::Debug,
        &[
            "debug",
            "fix",
            "error",
            "bug",
            "problem",
            "issue",
            "not working",
            "broken",
            "fails",
        ],
    ),
    (
        RequestType::Refactor,
        &["refactor", "clean", "simplify", "optimize", "restructure", "reorganize"],
    ),
    (
        RequestType::Explain,
        &["explain", "what does", "how does", "why", "understand", "clarify"],
    ),
];

/// Classify a query. Total: unmatched input is `Unknown`.
pub fn classify(query: &str) -> RequestType {
    let query = query.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| query.contains(kw)))
        .map(|(request_type, _)| *request_type)
        .unwrap_or(RequestType::Unknown)
}

// ============================================================================
// Tests
// ============================================================================
