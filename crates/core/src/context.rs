//! Request Context
//!
//! `RequestContext` is the immutable per-request input handed to every
//! handler: the workspace, the editor state (current file, selection, open
//! files), the free-text query, and an open-ended map of caller-supplied
//! context such as `error_message` or `stack_trace`.
//!
//! The only sanctioned "mutation" is `with_additional`, which produces a new
//! context carrying one extra entry. Multi-handler sequencing uses it to feed
//! a previous handler's output into the next one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Immutable input for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    workspace_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_code: Option<String>,
    #[serde(default)]
    open_files: Vec<String>,
    user_query: String,
    #[serde(default)]
    additional_context: Map<String, Value>,
}

impl RequestContext {
    /// Start building a context for the given workspace and query.
    pub fn builder(
        workspace_path: impl Into<String>,
        user_query: impl Into<String>,
    ) -> RequestContextBuilder {
        RequestContextBuilder::new(workspace_path, user_query)
    }

    /// Workspace identifier (usually the workspace root path).
    pub fn workspace_path(&self) -> &str {
        &self.workspace_path
    }

    /// Path of the file currently focused in the editor.
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Code snippet selected by the user.
    pub fn selected_code(&self) -> Option<&str> {
        self.selected_code.as_deref()
    }

    /// Paths of all open files.
    pub fn open_files(&self) -> &[String] {
        &self.open_files
    }

    /// The user's free-text request.
    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    /// Caller-supplied extra context.
    pub fn additional_context(&self) -> &Map<String, Value> {
        &self.additional_context
    }

    /// Look up a string entry from the additional context.
    pub fn additional_str(&self, key: &str) -> Option<&str> {
        self.additional_context.get(key).and_then(Value::as_str)
    }

    /// Return a copy of this context with one extra additional-context entry.
    ///
    /// An existing entry with the same key is replaced.
    pub fn with_additional(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.additional_context.insert(key.into(), value.into());
        next
    }

    /// The first `max_chars` characters of the query, for log records.
    pub fn query_prefix(&self, max_chars: usize) -> &str {
        match self.user_query.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.user_query[..idx],
            None => &self.user_query,
        }
    }
}

/// Builder for [`RequestContext`].
#[derive(Debug, Clone)]
pub struct RequestContextBuilder {
    workspace_path: String,
    user_query: String,
    current_file: Option<String>,
    selected_code: Option<String>,
    open_files: Vec<String>,
    additional_context: Map<String, Value>,
}

impl RequestContextBuilder {
    fn new(workspace_path: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            user_query: user_query.into(),
            current_file: None,
            selected_code: None,
            open_files: Vec::new(),
            additional_context: Map::new(),
        }
    }

    pub fn current_file(mut self, path: impl Into<String>) -> Self {
        self.current_file = Some(path.into());
        self
    }

    pub fn selected_code(mut self, code: impl Into<String>) -> Self {
        self.selected_code = Some(code.into());
        self
    }

    pub fn open_files(mut self, files: Vec<String>) -> Self {
        self.open_files = files;
        self
    }

    pub fn additional(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_context.insert(key.into(), value.into());
        self
    }

    pub fn additional_context(mut self, context: Map<String, Value>) -> Self {
        self.additional_context = context;
        self
    }

    /// Validate and build the context.
    ///
    /// The workspace path must be non-empty; the query may be empty (it then
    /// classifies as unknown and routes to the default handler).
    pub fn build(self) -> CoreResult<RequestContext> {
        if self.workspace_path.trim().is_empty() {
            return Err(CoreError::validation("workspace_path must not be empty"));
        }

        Ok(RequestContext {
            workspace_path: self.workspace_path,
            current_file: self.current_file,
            selected_code: self.selected_code,
            open_files: self.open_files,
            user_query: self.user_query,
            additional_context: self.additional_context,
        })
    }
}
