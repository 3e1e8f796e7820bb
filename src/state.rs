//! Application State
//!
//! Composition root. Builds every service from one validated `AppConfig` and
//! hands out shared references; nothing here is global.

use std::sync::Arc;
use std::time::Duration;

use breezer_llm::{CompletionProvider, OpenAiCompatibleProvider};
use breezer_tools::{get_tool_definitions, validate_tool_definitions, ToolExecutionService};

use crate::models::settings::AppConfig;
use crate::services::agent_service::AgentService;
use crate::services::conversation_store::ConversationStore;
use crate::services::handlers::{
    DebugHandler, DevopsHandler, DocumentationHandler, Handler, ImplementationHandler,
    RefactoringHandler, ReviewHandler, SecurityHandler, IMPLEMENTATION_TEMPERATURE,
};
use crate::services::llm::ModelRouter;
use crate::services::orchestrator::Orchestrator;
use crate::services::search::CodeSearch;
use crate::services::strategy::ToolCapableStrategy;
use crate::utils::error::{AppError, AppResult};

/// Shared application services.
pub struct AppState {
    config: AppConfig,
    router: Arc<ModelRouter>,
    orchestrator: Arc<Orchestrator>,
    store: Arc<ConversationStore>,
    agent_service: Arc<AgentService>,
}

impl AppState {
    /// Wire all services. Configuration problems surface here, never per
    /// request.
    pub fn build(
        config: AppConfig,
        provider: Arc<dyn CompletionProvider>,
        search: Arc<dyn CodeSearch>,
    ) -> AppResult<Self> {
        config.validate().map_err(AppError::config)?;

        let tools = get_tool_definitions();
        validate_tool_definitions(&tools).map_err(|e| AppError::config(e.to_string()))?;

        let router = Arc::new(ModelRouter::new(
            provider,
            config.models.clone(),
            Duration::from_secs(config.completion_timeout_secs),
        ));

        let strategy = ToolCapableStrategy::new(
            router.clone(),
            tools,
            IMPLEMENTATION_TEMPERATURE,
            config.max_tool_rounds,
        );
        let handlers: Vec<Arc<dyn Handler>> = vec![
            Arc::new(ImplementationHandler::new(
                strategy,
                search,
                config.related_examples_limit,
            )),
            Arc::new(ReviewHandler::new(router.clone())),
            Arc::new(DebugHandler::new(router.clone())),
            Arc::new(DocumentationHandler::new(router.clone())),
            Arc::new(RefactoringHandler::new(router.clone())),
            Arc::new(SecurityHandler::new(router.clone())),
            Arc::new(DevopsHandler::new(router.clone())),
        ];
        let orchestrator = Arc::new(Orchestrator::new(handlers));

        let store = Arc::new(ConversationStore::new(Duration::from_secs(
            config.tool_state_ttl_secs,
        )));
        let agent_service = Arc::new(AgentService::new(orchestrator.clone(), store.clone()));

        tracing::info!(
            provider = router.provider_name(),
            max_tool_rounds = config.max_tool_rounds,
            tool_state_ttl_secs = config.tool_state_ttl_secs,
            "Application state initialized"
        );

        Ok(Self {
            config,
            router,
            orchestrator,
            store,
            agent_service,
        })
    }

    /// Build with the OpenAI-compatible provider described by the config.
    pub fn from_config(config: AppConfig, search: Arc<dyn CodeSearch>) -> AppResult<Self> {
        let provider = OpenAiCompatibleProvider::new(config.provider.to_provider_config())?;
        Self::build(config, Arc::new(provider), search)
    }

    /// A tool executor bound to `workspace_path` using the configured tool
    /// settings.
    pub fn tool_executor(&self, workspace_path: &str) -> AppResult<ToolExecutionService> {
        Ok(ToolExecutionService::new(
            workspace_path,
            self.config.tools.clone(),
        )?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn router(&self) -> &Arc<ModelRouter> {
        &self.router
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn agent_service(&self) -> &Arc<AgentService> {
        &self.agent_service
    }
}
