use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use delta_api::config::ServerConfig;
use delta_api::router::build_app_router;
use delta_api::state::AppState;
use delta_pipeline::{JobRegistry, Pipeline};
use delta_providers::config::ProviderConfig;
use delta_providers::fal::FalApi;
use delta_providers::openai::OpenAIApi;
use delta_providers::storage::ModelStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "delta_api=debug,delta_pipeline=debug,delta_providers=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let provider_config = ProviderConfig::from_env();

    // --- Providers ---
    let client = reqwest::Client::new();
    let openai = Arc::new(OpenAIApi::with_client(client.clone(), &provider_config));
    let fal = Arc::new(FalApi::with_client(client, &provider_config));

    // --- Model storage ---
    let store: ModelStore = fal.store().clone();
    store
        .ensure_dir()
        .await
        .expect("Failed to create output directory");
    tracing::info!(dir = %store.root().display(), "Model output directory ready");

    if provider_config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; prompt and image endpoints will return 503");
    }
    if provider_config.fal_key.is_none() {
        tracing::warn!("FAL_KEY not set; 3D endpoints will return 503");
    }

    // --- Pipeline ---
    let jobs = Arc::new(JobRegistry::new());
    let pipeline = Pipeline::new(openai.clone(), openai, fal, Arc::clone(&jobs));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline,
        store,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, waiting for background jobs");
    drain_jobs(&jobs, Duration::from_secs(config.shutdown_timeout_secs)).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait until no async job is running, or until `timeout` elapses.
async fn drain_jobs(jobs: &JobRegistry, timeout: Duration) {
    let wait = async {
        while jobs.in_flight().await > 0 {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    };

    if tokio::time::timeout(timeout, wait).await.is_err() {
        let remaining = jobs.in_flight().await;
        tracing::warn!(remaining, "Shutdown timeout reached with jobs still running");
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
