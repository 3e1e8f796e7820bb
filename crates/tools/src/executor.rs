//! Tool Execution Service
//!
//! Executes catalog tools against a single workspace root. Every path
//! argument is resolved against the root and rejected if it escapes it
//! (including through symlinks). Terminal commands are restricted to a
//! whitelist of identifiers, each mapped to a configured command line.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;
const TERMINAL_COMMAND_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LIST_ENTRIES: i64 = 50;
const MAX_LIST_ENTRIES: i64 = 500;

/// Tool execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Overrides the request's workspace path as the root for all tools
    pub file_root: Option<PathBuf>,
    /// Largest file that may be read or overwritten
    pub max_file_size_bytes: u64,
    /// Writes need an explicit `confirm: true` argument
    pub require_confirmation: bool,
    /// Command identifiers the model may run
    pub terminal_whitelist: Vec<String>,
    /// Identifier -> command line
    pub terminal_command_map: HashMap<String, String>,
    pub web_lookup_enabled: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            file_root: None,
            max_file_size_bytes: 1024 * 1024,
            require_confirmation: true,
            terminal_whitelist: Vec::new(),
            terminal_command_map: HashMap::new(),
            web_lookup_enabled: false,
        }
    }
}

/// Errors raised when a tool request is invalid or its execution fails.
#[derive(Error, Debug)]
pub enum ToolExecutionError {
    #[error("Invalid workspace: {0}")]
    InvalidWorkspace(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Path escapes workspace root: {0}")]
    PathEscape(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File exceeds maximum allowed size of {limit} bytes: {path}")]
    TooLarge { path: String, limit: u64 },

    #[error("Write operation requires user confirmation")]
    ConfirmationRequired,

    #[error("Command not permitted: {0}")]
    CommandNotPermitted(String),

    #[error("Command mapping missing for: {0}")]
    CommandMappingMissing(String),

    #[error("Command executable not found: {0}")]
    CommandNotFound(String),

    #[error("Command timed out after {seconds}s")]
    CommandTimedOut { seconds: u64 },

    #[error("{0} is disabled")]
    Disabled(String),

    #[error("{0} not yet implemented")]
    NotImplemented(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolExecutionError {
    fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
enum FileEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
    #[serde(rename = "utf-16")]
    Utf16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileReadArgs {
    path: String,
    #[serde(default)]
    encoding: FileEncoding,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileWriteArgs {
    path: String,
    content: String,
    #[serde(default)]
    mode: WriteMode,
    #[serde(default)]
    confirm: Option<bool>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileListArgs {
    path: String,
    #[serde(default)]
    max_entries: Option<i64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GitStatusArgs {
    #[serde(default)]
    detailed: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GitDiffArgs {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    staged: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TerminalCommandArgs {
    command: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WebLookupArgs {
    query: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DiagnosticsArgs {
    #[serde(default)]
    limit: Option<i64>,
}

/// Executes workspace-scoped tools with safety checks.
pub struct ToolExecutionService {
    workspace_root: PathBuf,
    settings: ToolSettings,
}

impl ToolExecutionService {
    /// Create a service rooted at `settings.file_root`, or at
    /// `workspace_path` when no override is configured. The root must exist.
    pub fn new(workspace_path: &str, settings: ToolSettings) -> Result<Self, ToolExecutionError> {
        let base = match &settings.file_root {
            Some(root) => root.clone(),
            None if workspace_path.trim().is_empty() => {
                return Err(ToolExecutionError::InvalidWorkspace(
                    "Workspace path is required".to_string(),
                ))
            }
            None => PathBuf::from(workspace_path),
        };

        let workspace_root = base.canonicalize().map_err(|_| {
            ToolExecutionError::InvalidWorkspace(format!(
                "Workspace root does not exist: {}",
                base.display()
            ))
        })?;

        Ok(Self {
            workspace_root,
            settings,
        })
    }

    /// Canonical workspace root all paths are resolved against.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a tool by name with given arguments
    pub async fn execute(&self, name: &str, arguments: &Value) -> Result<Value, ToolExecutionError> {
        tracing::debug!(tool = name, root = %self.workspace_root.display(), "Executing tool");

        match name {
            "file_read" => self.file_read(parse_args(name, arguments)?).await,
            "file_write" => self.file_write(parse_args(name, arguments)?).await,
            "file_list" => self.file_list(parse_args(name, arguments)?).await,
            "git_status" => self.git_status(parse_args(name, arguments)?).await,
            "git_diff" => self.git_diff(parse_args(name, arguments)?).await,
            "terminal_command" => self.terminal_command(parse_args(name, arguments)?).await,
            "web_lookup" => self.web_lookup(parse_args(name, arguments)?),
            "workspace_diagnostics" => self.workspace_diagnostics(parse_args(name, arguments)?),
            other => Err(ToolExecutionError::UnknownTool(other.to_string())),
        }
    }

    // ── Path resolution ────────────────────────────────────────────────

    /// Resolve a path argument inside the workspace root.
    ///
    /// `..` components are folded lexically, then the deepest existing
    /// ancestor is canonicalized so symlinks cannot lead outside the root.
    /// A symlink counts as existing even when dangling; one whose target is
    /// missing is rejected, since writing through it would create the target.
    fn resolve_path(&self, relative: &str) -> Result<PathBuf, ToolExecutionError> {
        let joined = lexical_normalize(&self.workspace_root.join(relative));

        let mut existing = joined.as_path();
        let mut tail = Vec::new();
        while std::fs::symlink_metadata(existing).is_err() {
            match (existing.file_name(), existing.parent()) {
                (Some(name), Some(parent)) => {
                    tail.push(name.to_os_string());
                    existing = parent;
                }
                _ => break,
            }
        }

        let mut resolved = match existing.canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && is_symlink(existing) => {
                tracing::warn!(path = relative, "Rejected dangling symlink");
                return Err(ToolExecutionError::PathEscape(relative.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        for part in tail.into_iter().rev() {
            resolved.push(part);
        }

        if !resolved.starts_with(&self.workspace_root) {
            return Err(ToolExecutionError::PathEscape(relative.to_string()));
        }
        Ok(resolved)
    }

    fn display_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.workspace_root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }

    async fn check_size(&self, path: &Path) -> Result<(), ToolExecutionError> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > self.settings.max_file_size_bytes {
            return Err(ToolExecutionError::TooLarge {
                path: self.display_path(path),
                limit: self.settings.max_file_size_bytes,
            });
        }
        Ok(())
    }

    // ── File tools ─────────────────────────────────────────────────────

    async fn file_read(&self, args: FileReadArgs) -> Result<Value, ToolExecutionError> {
        let target = self.resolve_path(&args.path)?;
        if !target.is_file() {
            return Err(ToolExecutionError::NotFound(format!("File {}", args.path)));
        }
        self.check_size(&target).await?;

        let bytes = tokio::fs::read(&target).await?;
        let content = decode(bytes, args.encoding)
            .map_err(|message| ToolExecutionError::invalid_arguments("file_read", message))?;

        Ok(json!({
            "path": self.display_path(&target),
            "content": content,
        }))
    }

    async fn file_write(&self, args: FileWriteArgs) -> Result<Value, ToolExecutionError> {
        if self.settings.require_confirmation && args.confirm != Some(true) {
            return Err(ToolExecutionError::ConfirmationRequired);
        }

        let target = self.resolve_path(&args.path)?;
        if target.exists() {
            self.check_size(&target).await?;
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match args.mode {
            WriteMode::Append => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&target)
                    .await?;
                file.write_all(args.content.as_bytes()).await?;
                file.flush().await?;
            }
            WriteMode::Overwrite => tokio::fs::write(&target, args.content.as_bytes()).await?,
        }

        Ok(json!({
            "path": self.display_path(&target),
            "written_bytes": args.content.len(),
        }))
    }

    async fn file_list(&self, args: FileListArgs) -> Result<Value, ToolExecutionError> {
        let max_entries = args
            .max_entries
            .unwrap_or(DEFAULT_LIST_ENTRIES)
            .clamp(1, MAX_LIST_ENTRIES) as usize;

        let target = self.resolve_path(&args.path)?;
        if !target.exists() {
            return Err(ToolExecutionError::NotFound(format!("Directory {}", args.path)));
        }
        if !target.is_dir() {
            return Err(ToolExecutionError::invalid_arguments(
                "file_list",
                "Path is not a directory",
            ));
        }

        let mut children = Vec::new();
        let mut dir = tokio::fs::read_dir(&target).await?;
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            children.push((entry.file_name().to_string_lossy().into_owned(), metadata));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));

        let entries: Vec<Value> = children
            .into_iter()
            .take(max_entries)
            .map(|(name, metadata)| {
                let is_dir = metadata.is_dir();
                json!({
                    "name": name,
                    "is_dir": is_dir,
                    "size": if is_dir { None } else { Some(metadata.len()) },
                })
            })
            .collect();

        Ok(json!({
            "path": self.display_path(&target),
            "entries": entries,
        }))
    }

    // ── Command tools ──────────────────────────────────────────────────

    async fn git_status(&self, args: GitStatusArgs) -> Result<Value, ToolExecutionError> {
        let mut cmd = vec!["status".to_string()];
        if args.detailed {
            cmd.extend(["--porcelain".to_string(), "-b".to_string()]);
        }
        self.run_command("git", &cmd, DEFAULT_COMMAND_TIMEOUT_SECS).await
    }

    async fn git_diff(&self, args: GitDiffArgs) -> Result<Value, ToolExecutionError> {
        let mut cmd = vec!["diff".to_string()];
        if args.staged {
            cmd.push("--cached".to_string());
        }
        if let Some(path) = args.path.as_deref().filter(|p| !p.is_empty()) {
            let target = self.resolve_path(path)?;
            cmd.push("--".to_string());
            cmd.push(self.display_path(&target));
        }
        self.run_command("git", &cmd, DEFAULT_COMMAND_TIMEOUT_SECS).await
    }

    async fn terminal_command(&self, args: TerminalCommandArgs) -> Result<Value, ToolExecutionError> {
        if !self.settings.terminal_whitelist.contains(&args.command) {
            return Err(ToolExecutionError::CommandNotPermitted(args.command));
        }
        let mapped = self
            .settings
            .terminal_command_map
            .get(&args.command)
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ToolExecutionError::CommandMappingMissing(args.command.clone()))?;

        let mut words = shell_words::split(mapped)
            .map_err(|e| ToolExecutionError::CommandMappingMissing(format!("{} ({})", args.command, e)))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| ToolExecutionError::CommandMappingMissing(args.command.clone()))?;
        let rest: Vec<String> = words.collect();

        self.run_command(&program, &rest, TERMINAL_COMMAND_TIMEOUT_SECS)
            .await
    }

    async fn run_command(
        &self,
        program: &str,
        args: &[String],
        timeout_secs: u64,
    ) -> Result<Value, ToolExecutionError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.workspace_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Err(_) => {
                tracing::warn!(program, timeout_secs, "Tool command timed out");
                return Err(ToolExecutionError::CommandTimedOut {
                    seconds: timeout_secs,
                });
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolExecutionError::CommandNotFound(program.to_string()))
            }
            Ok(Err(e)) => return Err(ToolExecutionError::Io(e)),
            Ok(Ok(output)) => output,
        };

        let command_line = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(json!({
            "command": command_line,
            "exit_code": output.status.code(),
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        }))
    }

    // ── Lookup tools ───────────────────────────────────────────────────

    fn web_lookup(&self, args: WebLookupArgs) -> Result<Value, ToolExecutionError> {
        if !self.settings.web_lookup_enabled {
            return Err(ToolExecutionError::Disabled("Web lookup".to_string()));
        }
        // No approved provider is wired in yet
        Ok(json!({"query": args.query, "results": []}))
    }

    fn workspace_diagnostics(&self, args: DiagnosticsArgs) -> Result<Value, ToolExecutionError> {
        tracing::debug!(limit = ?args.limit, "Workspace diagnostics requested");
        Err(ToolExecutionError::NotImplemented(
            "Workspace diagnostics".to_string(),
        ))
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T, ToolExecutionError> {
    let value = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(value)
        .map_err(|e| ToolExecutionError::invalid_arguments(tool, e.to_string()))
}

fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn decode(bytes: Vec<u8>, encoding: FileEncoding) -> Result<String, String> {
    match encoding {
        FileEncoding::Utf8 => {
            String::from_utf8(bytes).map_err(|_| "File is not valid utf-8".to_string())
        }
        FileEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        FileEncoding::Utf16 => {
            let (little_endian, body) = match bytes.as_slice() {
                [0xFF, 0xFE, rest @ ..] => (true, rest),
                [0xFE, 0xFF, rest @ ..] => (false, rest),
                all => (true, all),
            };
            if body.len() % 2 != 0 {
                return Err("File is not valid utf-16".to_string());
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| {
                    if little_endian {
                        u16::from_le_bytes([pair[0], pair[1]])
                    } else {
                        u16::from_be_bytes([pair[0], pair[1]])
                    }
                })
                .collect();
            String::from_utf16(&units).map_err(|_| "File is not valid utf-16".to_string())
        }
    }
}
