use anyhow::Context;
use hydrotrack::api::{self, app_state::AppState};
use hydrotrack::config::ConfigLoader;
use hydrotrack::observability::{
    AppMetrics, ObservabilityState, create_observability_router, init_tracing,
};
use hydrotrack::providers::create_providers;
use hydrotrack::services::{AssistantService, InMemoryProfileStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );
    ConfigLoader::validate(&config).context("invalid configuration")?;
    info!("Configuration loaded successfully");

    let providers = create_providers(&config)?;
    info!(
        "Providers initialized (translator backend: {})",
        config.translator.backend
    );

    let metrics = Arc::new(AppMetrics::default());
    let assistant = AssistantService::new(
        Arc::new(InMemoryProfileStore::new()),
        providers,
        metrics.clone(),
        Duration::from_secs(config.providers.timeout_secs),
    );
    info!("Assistant service initialized");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics.clone(),
    ));

    let api_router = api::create_router(AppState::new(assistant, metrics));
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
