//! Tool Definitions
//!
//! The fixed catalog offered to the tool-routing model. Schemas are closed
//! objects (`additionalProperties: false`).

use std::collections::{HashMap, HashSet};

use breezer_core::{CoreError, CoreResult};
use breezer_llm::{ParameterSchema, ToolDefinition};

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        file_read_tool(),
        file_write_tool(),
        file_list_tool(),
        git_status_tool(),
        git_diff_tool(),
        terminal_command_tool(),
        web_lookup_tool(),
        workspace_diagnostics_tool(),
    ]
}

/// Check a tool catalog before it is ever offered to a model.
///
/// Names must be non-empty and unique, every schema must be an object, and
/// every required key must be a declared property.
pub fn validate_tool_definitions(definitions: &[ToolDefinition]) -> CoreResult<()> {
    let mut seen = HashSet::new();

    for def in definitions {
        if def.name.trim().is_empty() {
            return Err(CoreError::config("Tool definition with empty name"));
        }
        if !seen.insert(def.name.as_str()) {
            return Err(CoreError::config(format!(
                "Duplicate tool definition: {}",
                def.name
            )));
        }
        if def.input_schema.schema_type != "object" {
            return Err(CoreError::config(format!(
                "Tool '{}' schema must be an object, got '{}'",
                def.name, def.input_schema.schema_type
            )));
        }

        let properties = def.input_schema.properties.as_ref();
        for key in def.input_schema.required.iter().flatten() {
            if !properties.is_some_and(|p| p.contains_key(key)) {
                return Err(CoreError::config(format!(
                    "Tool '{}' requires undeclared parameter '{}'",
                    def.name, key
                )));
            }
        }
    }

    Ok(())
}

fn tool(
    name: &str,
    description: &str,
    properties: HashMap<String, ParameterSchema>,
    required: &[&str],
) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: ParameterSchema::object(
            None,
            properties,
            required.iter().map(|r| r.to_string()).collect(),
        ),
    }
}

fn file_read_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "path".to_string(),
        ParameterSchema::string(Some("Relative path to the file from the workspace root.")),
    );
    properties.insert(
        "encoding".to_string(),
        ParameterSchema::string_enum(
            Some("Encoding to use when reading the file (default utf-8)."),
            &["utf-8", "latin-1", "utf-16"],
        ),
    );

    tool(
        "file_read",
        "Read the contents of a file within the current workspace.",
        properties,
        &["path"],
    )
}

fn file_write_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "path".to_string(),
        ParameterSchema::string(Some("Relative path to the target file.")),
    );
    properties.insert(
        "content".to_string(),
        ParameterSchema::string(Some("Full text content to write into the file.")),
    );
    properties.insert(
        "mode".to_string(),
        ParameterSchema::string_enum(
            Some("Whether to overwrite or append to the file (default overwrite)."),
            &["overwrite", "append"],
        ),
    );
    properties.insert(
        "confirm".to_string(),
        ParameterSchema::boolean(Some(
            "Set to true once the user has approved the write operation.",
        )),
    );

    tool(
        "file_write",
        "Write text content to a file within the workspace. Requires confirmation for destructive edits.",
        properties,
        &["path", "content"],
    )
}

fn file_list_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "path".to_string(),
        ParameterSchema::string(Some("Relative directory path to inspect.")),
    );
    properties.insert(
        "max_entries".to_string(),
        ParameterSchema::bounded_integer(
            Some("Maximum number of entries to return (default 50)."),
            1,
            500,
        ),
    );

    tool(
        "file_list",
        "List files and folders beneath a directory.",
        properties,
        &["path"],
    )
}

fn git_status_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "detailed".to_string(),
        ParameterSchema::boolean(Some("When true, include verbose porcelain output.")),
    );

    tool(
        "git_status",
        "Show git status for the workspace with optional short or detailed output.",
        properties,
        &[],
    )
}

fn git_diff_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "path".to_string(),
        ParameterSchema::string(Some("Optional relative path to limit the diff.")),
    );
    properties.insert(
        "staged".to_string(),
        ParameterSchema::boolean(Some("When true, show staged changes (git diff --cached).")),
    );

    tool(
        "git_diff",
        "Compute a git diff for the workspace (optionally for a specific path).",
        properties,
        &[],
    )
}

fn terminal_command_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "command".to_string(),
        ParameterSchema::string(Some(
            "Identifier of the whitelisted command to execute (e.g., npm_test, pytest).",
        )),
    );

    tool(
        "terminal_command",
        "Run a whitelisted terminal command within the workspace sandbox.",
        properties,
        &["command"],
    )
}

fn web_lookup_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "query".to_string(),
        ParameterSchema::string(Some(
            "Short search query to forward to the approved provider.",
        )),
    );

    tool(
        "web_lookup",
        "Perform a curated web lookup (documentation or knowledge base).",
        properties,
        &["query"],
    )
}

fn workspace_diagnostics_tool() -> ToolDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "limit".to_string(),
        ParameterSchema::bounded_integer(
            Some("Maximum number of diagnostics to return (default 50)."),
            1,
            200,
        ),
    );

    tool(
        "workspace_diagnostics",
        "Fetch summarized LSP diagnostics and workspace symbols.",
        properties,
        &[],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let names: Vec<String> = get_tool_definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "file_read",
                "file_write",
                "file_list",
                "git_status",
                "git_diff",
                "terminal_command",
                "web_lookup",
                "workspace_diagnostics",
            ]
        );
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        assert!(validate_tool_definitions(&get_tool_definitions()).is_ok());
    }

    #[test]
    fn test_schemas_are_closed_objects() {
        for def in get_tool_definitions() {
            let json = serde_json::to_value(&def.input_schema).unwrap();
            assert_eq!(json["type"], "object", "{}", def.name);
            assert_eq!(json["additionalProperties"], false, "{}", def.name);
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let defs = vec![web_lookup_tool(), web_lookup_tool()];
        let err = validate_tool_definitions(&defs).unwrap_err();
        assert!(err.to_string().contains("Duplicate tool definition"));
    }

    #[test]
    fn test_required_key_must_be_declared() {
        let mut def = git_status_tool();
        def.input_schema.required = Some(vec!["missing".to_string()]);
        let err = validate_tool_definitions(&[def]).unwrap_err();
        assert!(err.to_string().contains("undeclared parameter 'missing'"));
    }

    #[test]
    fn test_non_object_schema_rejected() {
        let def = ToolDefinition {
            name: "bad".to_string(),
            description: "bad".to_string(),
            input_schema: ParameterSchema::string(None),
        };
        assert!(matches!(
            validate_tool_definitions(&[def]),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut def = web_lookup_tool();
        def.name = "  ".to_string();
        assert!(validate_tool_definitions(&[def]).is_err());
    }
}
