//! Related-Example Lookup
//!
//! Narrow interface to whatever code index the deployment provides. Lookup
//! failures never fail a request; callers degrade to an empty list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::error::AppResult;

/// A snippet from the workspace similar to the current request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExample {
    pub file_path: String,
    pub language: String,
    pub content: String,
}

#[async_trait]
pub trait CodeSearch: Send + Sync {
    async fn search(&self, query: &str, workspace_id: &str, limit: usize) -> AppResult<Vec<CodeExample>>;
}

/// Lookup used when no index is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCodeSearch;

#[async_trait]
impl CodeSearch for NoopCodeSearch {
    async fn search(&self, _query: &str, _workspace_id: &str, _limit: usize) -> AppResult<Vec<CodeExample>> {
        Ok(Vec::new())
    }
}
