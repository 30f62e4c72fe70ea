//! # Error Policy
//!
//! Requeue decisions for reconciliations that returned an error.
//!
//! Only transient failures reach this layer (API errors, timeouts); invalid
//! chains and write conflicts are resolved inside `reconcile`. Each secret
//! keeps its own Fibonacci backoff so one flapping secret does not slow down
//! the rest.

use crate::controller::reconciler::{Reconciler, ReconcilerError, SecretRef};
use crate::observability::metrics;
use k8s_openapi::api::core::v1::Secret;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub fn handle_reconciliation_error(
    obj: Arc<Secret>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let secret = SecretRef::from_secret(&obj);

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.reconciliation_error",
        secret.namespace = secret.namespace.as_str(),
        secret.name = secret.name.as_str(),
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}: {:?}", secret, error);
    metrics::increment_reconciliation_errors();

    let (backoff_seconds, error_count) = ctx.next_backoff(&secret);
    let next_trigger_time = i64::try_from(backoff_seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|delay| chrono::Utc::now().checked_add_signed(delay))
        .map_or_else(|| "unknown".to_string(), |at| at.to_rfc3339());

    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}, next attempt at {})",
        backoff_seconds,
        error_count,
        next_trigger_time
    );

    metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}
