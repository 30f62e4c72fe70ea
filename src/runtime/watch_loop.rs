//! # Watch Loop
//!
//! Runs the kube-runtime controller over `Secret` objects.
//!
//! kube-runtime runs at most one reconciliation per secret at a time, which
//! is what keeps two attempts on the same secret from racing each other.

use crate::config::ControllerConfig;
use crate::constants::TLS_FIELD_SELECTOR;
use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::runtime::error_policy::handle_reconciliation_error;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::Client;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Secrets API for the configured scope
#[must_use]
pub fn secrets_api(client: Client, config: &ControllerConfig) -> Api<Secret> {
    match config.watch_namespace.as_deref() {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    }
}

/// Watcher configuration for the configured scope
#[must_use]
pub fn watcher_config(config: &ControllerConfig) -> watcher::Config {
    let watcher_config = watcher::Config::default();
    if config.tls_field_selector {
        watcher_config.fields(TLS_FIELD_SELECTOR)
    } else {
        watcher_config
    }
}

/// Run the controller until a shutdown signal arrives
pub async fn run_watch_loop(
    client: Client,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) {
    let config = reconciler.config.clone();
    let scope = config.watch_namespace.as_deref().unwrap_or("<all namespaces>");
    info!(
        namespace = scope,
        tls_field_selector = config.tls_field_selector,
        "Starting controller watch loop..."
    );

    Controller::new(secrets_api(client, &config), watcher_config(&config))
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| {
            match result {
                Ok((obj, action)) => debug!(secret = %obj, ?action, "watch.event.success"),
                Err(e) => warn!(error = %e, "Controller stream error"),
            }
            futures::future::ready(())
        })
        .await;

    server_state.set_ready(false);
    info!("Controller stopped gracefully");
}
