//! Artifact Manager server - main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use artifact_core::{
    api::{self, artifacts::ArtifactStore, AppState},
    auth::{AuthLayer, PolicyEngine, TokenVerifier},
    config::Config,
    health::HealthService,
    observability,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config: {}. Using defaults.", e);
        Config::default()
    });

    // Initialize observability
    observability::init("artifact-server", &config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Artifact Manager"
    );

    // Prometheus recorder backing the actuator metrics endpoint
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    // Token verifier and policy engine are fixed for the process lifetime.
    let verifier = TokenVerifier::new(config.auth.clone().into())
        .map_err(|e| anyhow::anyhow!("Auth configuration rejected: {}", e))?;
    let engine = PolicyEngine::new();

    tracing::info!(
        idp = %verifier.idp_type(),
        rules = engine.rules().len(),
        "Authorization policy initialized"
    );

    let state = AppState {
        store: Arc::new(ArtifactStore::with_seed_data()),
        health: Arc::new(HealthService::new()),
        metrics,
    };

    let auth = AuthLayer::new(Arc::new(verifier), Arc::new(engine));
    let app = api::build_router(state, auth);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    observability::shutdown();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
