//! # CA Completer
//!
//! A Kubernetes controller that completes TLS secrets: when a
//! `kubernetes.io/tls` secret has a certificate chain in `tls.crt` and an
//! empty `ca.crt`, it writes the last certificate of the chain to `ca.crt`.
//!
//! Secrets that already have a `ca.crt` are never touched. A malformed
//! `tls.crt` is reported as a Warning Event on the secret.

use anyhow::Result;
use ca_completer::runtime::{initialization, watch_loop};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialization::initialize().await?;

    watch_loop::run_watch_loop(init.client, init.reconciler, init.server_state).await;

    info!("Controller stopped");
    Ok(())
}
