//! Breezer CLI
//!
//! ```bash
//! # Route a query and print the JSON response
//! breezer query "add a health endpoint" --workspace .
//!
//! # Execute requested tools locally until the answer is final
//! breezer query "why does the build fail" --workspace . --execute-tools
//!
//! # List registered handlers
//! breezer handlers
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use breezer::models::{QueryRequest, QueryResponse, ToolResultRequest};
use breezer::services::NoopCodeSearch;
use breezer::storage::ConfigService;
use breezer::AppState;
use breezer_core::ToolCallResult;
use breezer_tools::ToolExecutionService;

#[derive(Parser)]
#[command(name = "breezer")]
#[command(about = "Route coding requests to task handlers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ~/.breezer/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a query
    Query {
        /// The request text
        text: String,

        /// Workspace root
        #[arg(short, long, default_value = ".")]
        workspace: String,

        /// File currently open in the editor
        #[arg(short, long)]
        file: Option<String>,

        /// Code selected in the editor
        #[arg(long)]
        selected_code: Option<String>,

        /// Run requested tools locally and submit their results
        #[arg(long)]
        execute_tools: bool,
    },

    /// List registered handlers
    Handlers,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breezer=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    }
    .context("Failed to load configuration")?;

    let state = AppState::from_config(config_service.get_config_clone(), Arc::new(NoopCodeSearch))
        .context("Failed to initialize application state")?;

    match cli.command {
        Commands::Query {
            text,
            workspace,
            file,
            selected_code,
            execute_tools,
        } => {
            let mut request = QueryRequest::new(workspace.as_str(), text);
            request.current_file = file;
            request.selected_code = selected_code;

            let service = state.agent_service();
            let mut response = service.submit_query(request).await?;

            if execute_tools {
                let executor = state.tool_executor(&workspace)?;
                while response.requires_tool {
                    let results = run_tools(&executor, &response).await;
                    response = service
                        .submit_tool_results(ToolResultRequest {
                            request_id: response.request_id.clone(),
                            tool_results: results,
                        })
                        .await?;
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Handlers => {
            let list = state.agent_service().list_handlers();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
    }

    Ok(())
}

/// Execute every requested call. Failures are reported to the model as
/// output text.
async fn run_tools(executor: &ToolExecutionService, response: &QueryResponse) -> Vec<ToolCallResult> {
    let mut results = Vec::with_capacity(response.tool_calls.len());
    for call in &response.tool_calls {
        tracing::info!(tool = %call.name, id = %call.id, "Running tool");
        let output = match executor.execute(&call.name, &call.arguments).await {
            Ok(value) => serde_json::to_string(&value).unwrap_or_else(|e| format!("Error: {}", e)),
            Err(e) => format!("Error: {}", e),
        };
        results.push(ToolCallResult::new(call.id.as_str(), call.name.as_str(), output));
    }
    results
}
