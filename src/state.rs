use std::sync::Arc;

use anyhow::Context;
use shipwreck_agent::SqlAgent;
use shipwreck_agent::llm::{ChatModel, OpenAiChatModel};
use shipwreck_config::{AgentConfig, CorsConfig, DatabaseConfig, LlmConfig};
use shipwreck_db::Database;

use crate::metrics::MeteredChatModel;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub agent: Arc<SqlAgent>,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// Build state around an existing database handle and model.
    pub fn new(
        db: Database,
        model: Arc<dyn ChatModel>,
        agent_config: AgentConfig,
        cors_config: CorsConfig,
    ) -> Self {
        let agent = SqlAgent::new(model, db.clone(), agent_config);
        Self {
            db,
            agent: Arc::new(agent),
            cors_config,
        }
    }
}

/// Connect to the database and the hosted model using environment config.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let llm_config = LlmConfig::from_env().context("language model configuration")?;
    let db_config = DatabaseConfig::from_env();

    let db = Database::connect(&db_config)
        .await
        .with_context(|| format!("failed to open database at {}", db_config.redacted_url()))?;

    let client = OpenAiChatModel::new(llm_config).context("failed to build LLM client")?;
    let model: Arc<dyn ChatModel> = Arc::new(MeteredChatModel::new(Arc::new(client)));

    Ok(AppState::new(
        db,
        model,
        AgentConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
