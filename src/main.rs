//! RecoServe Engine
//!
//! A recommendation serving API backed by precomputed model artifacts.
//!
//! # Architecture
//!
//! - **Artifact store**: item catalog, popularity list, and per-model user
//!   tables loaded once at startup
//! - **Model registry**: model-name resolution with popularity fallback
//!   for cold users
//! - **API server**: REST endpoint for recommendation consumers
//!
//! # Graceful Shutdown
//!
//! The engine handles SIGTERM and SIGINT signals, ensuring in-flight
//! requests complete before the process exits.

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recoserve::api::{self, AppState};
use recoserve::config::Config;
use recoserve::error::Result;
use recoserve::recommendation::store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with structured logging
    init_tracing();

    info!("═══════════════════════════════════════════════════════════════");
    info!("  🚀 RecoServe Engine v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════════════════════════");
    info!("  Components:");
    info!("    • Artifact Store (catalog + model tables)");
    info!("    • Model Registry");
    info!("    • REST API Server");
    info!("═══════════════════════════════════════════════════════════════");

    // Load configuration
    let config = Config::from_env()?;
    let config = Arc::new(config);
    info!("✅ Configuration loaded and validated");

    // Load recommendation artifacts
    info!("📦 Loading recommendation artifacts...");
    let registry = store::load_registry(&config.artifacts.dir)?;
    info!(
        "✅ Artifacts loaded, serving models: {}",
        registry.model_names().join(", ")
    );

    // Create shared state
    let state = Arc::new(AppState::new(registry, &config));

    // Create shutdown channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Spawn API server
    info!("🌐 Starting API server on port {}...", config.api.port);
    let mut handles = vec![spawn_api_server(
        state,
        config.clone(),
        shutdown_tx.clone(),
    )];

    info!("═══════════════════════════════════════════════════════════════");
    info!("  ✅ Service started successfully");
    info!("  📡 API: http://{}:{}", config.api.host, config.api.port);
    info!(
        "  🔗 Health: http://{}:{}/health",
        config.api.host, config.api.port
    );
    info!("═══════════════════════════════════════════════════════════════");

    // Wait for shutdown signal or service failure
    tokio::select! {
        _ = shutdown_signal() => {
            info!("📴 Shutdown signal received");
        }
        _ = wait_for_any_failure(&mut handles) => {
            warn!("⚠️ A service failed, initiating shutdown");
        }
    }

    // Graceful shutdown
    info!("🛑 Initiating graceful shutdown...");

    // Signal all services to stop
    let _ = shutdown_tx.send(());

    // Wait for services to finish with timeout
    let shutdown_timeout = Duration::from_secs(30);
    if tokio::time::timeout(shutdown_timeout, shutdown_services(handles))
        .await
        .is_err()
    {
        warn!("⚠️ Shutdown timeout exceeded, forcing exit");
    }

    info!("👋 RecoServe Engine stopped gracefully");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Default log levels
        EnvFilter::new("recoserve=debug,tower_http=debug,info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .init();
}

/// Spawn the API server
fn spawn_api_server(
    state: Arc<AppState>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        tokio::select! {
            result = api::start_server(state, &config.api) => {
                if let Err(e) = result {
                    error!("API server error: {:?}", e);
                }
            }
            _ = shutdown_rx.recv() => {
                info!("API server shutting down");
            }
        }
    })
}

/// Wait for any task to fail
async fn wait_for_any_failure(handles: &mut [tokio::task::JoinHandle<()>]) {
    loop {
        for handle in handles.iter_mut() {
            if handle.is_finished() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Wait for all services to complete shutdown
async fn shutdown_services(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
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
}
