use std::net::SocketAddr;
use std::sync::Arc;

use atelier_provider::GenerationApi;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_api::config::ServerConfig;
use atelier_api::router::build_app_router;
use atelier_api::state::{build_artifact_store, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "atelier_api=debug,atelier_provider=debug,atelier_storage=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = config.storage.backend_name(),
        provider = %config.provider.api_url,
        max_attempts = config.tracker.max_attempts,
        poll_interval_ms = config.tracker.poll_interval.as_millis() as u64,
        promotion = %config.tracker.promotion,
        "Loaded server configuration",
    );
    if !config.timeout_covers_tracker() {
        tracing::warn!(
            request_timeout_secs = config.request_timeout_secs,
            tracker_max_wait_secs = config.tracker.max_wait().as_secs(),
            "REQUEST_TIMEOUT_SECS is shorter than the tracker budget; long batches will be cut off",
        );
    }

    // --- Artifact store ---
    let store = build_artifact_store(&config.storage)
        .await
        .expect("Failed to initialize artifact store");
    tracing::info!(backend = store.backend_name(), "Artifact store ready");

    // --- Provider ---
    let provider = GenerationApi::new(
        config.provider.api_url.clone(),
        config.provider.api_key.clone(),
    )
    .expect("Failed to build provider HTTP client");
    if config.provider.api_key.is_none() {
        tracing::warn!("PROVIDER_API_KEY is not set; provider requests are unauthenticated");
    }

    // --- App state ---
    let state = AppState::new(config.clone(), Arc::new(provider), store);

    // --- Router ---
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

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
