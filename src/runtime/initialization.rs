//! # Initialization
//!
//! Controller startup: rustls provider, tracing, metrics, HTTP server,
//! Kubernetes client and the shared reconciler context.

use crate::config::{ControllerConfig, ServerConfig};
use crate::constants::DEFAULT_LOG_FILTER;
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::observability::events::{EventPublisher, KubeEventPublisher, NoopEventPublisher};
use crate::observability::metrics;
use crate::store::KubeSecretStore;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything the watch loop needs
pub struct InitializationResult {
    pub client: Client,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
    pub controller_config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready())
            .field("controller_config", &self.controller_config)
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// # Errors
///
/// Fails when metrics cannot be registered, the HTTP server does not come up
/// in time, or no Kubernetes client configuration is available.
pub async fn initialize() -> Result<InitializationResult> {
    // Required for rustls 0.23+ when no default provider is set via features.
    // Ignore the error: a provider may already be installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    init_tracing();

    info!("Starting CA completer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let controller_config = ControllerConfig::from_env();
    let server_config = ServerConfig::from_env();
    info!(?controller_config, ?server_config, "Loaded configuration");

    metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = server_state.clone();
    let server_port = server_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let store = Arc::new(KubeSecretStore::new(
        client.clone(),
        controller_config.controller_name.clone(),
    ));
    let events: Arc<dyn EventPublisher> = if controller_config.publish_events {
        Arc::new(KubeEventPublisher::new(
            client.clone(),
            &controller_config.controller_name,
        ))
    } else {
        Arc::new(NoopEventPublisher)
    };
    let reconciler = Arc::new(Reconciler::new(store, events, controller_config.clone()));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        reconciler,
        server_state,
        controller_config,
    })
}

/// Install the global tracing subscriber (`RUST_LOG`, defaulting to info for this crate)
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Tracing subscriber already initialized: {e}");
    }
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &ServerState,
    server_handle: &tokio::task::JoinHandle<()>,
    server_config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = server_config.startup_timeout();
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(server_config.poll_interval()).await;
    }
}
