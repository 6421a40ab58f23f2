use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smith_gateway::providers::{OpenAiCompatibleClient, Provider};
use smith_gateway::state::AppState;
use smith_gateway::{cli, server};
use smith_knowledge::{EmbeddingClient, KnowledgeRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = smith_core::Config::load()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Configuration loaded (completion model: {}, image model: {})",
        config.settings.model.completion_model, config.settings.model.image_model
    );

    let api_key = config.openai_api_key().map(str::to_string);
    let provider = OpenAiCompatibleClient::new(&config.settings.model, api_key.clone())?;
    info!(
        "Language model provider: {} ({})",
        provider.name(),
        provider.model()
    );

    let knowledge_settings = config.knowledge_settings();
    let embedder = EmbeddingClient::new(&knowledge_settings, api_key)?;
    let registry = KnowledgeRegistry::load(&knowledge_settings, Arc::new(embedder)).await?;
    info!(
        "Knowledge bases in {}: {} (current: {})",
        registry.root().display(),
        registry.list_base_names().join(", "),
        registry.current_base_name()
    );

    let state = Arc::new(AppState::new(Arc::new(registry), Arc::new(provider)));

    let web_task = if config.web_enabled() {
        let bind_addr = config.bind_addr();
        Some(tokio::spawn(server::run(Arc::clone(&state), bind_addr)))
    } else {
        None
    };

    if config.cli_enabled() {
        cli::run(Arc::clone(&state)).await?;
    }

    if let Some(task) = web_task {
        task.await??;
    }

    info!("agent-smith shutting down");
    Ok(())
}
