//! # Reconcile
//!
//! Entry points driven by secret events.
//!
//! [`on_secret_event`] is the store-agnostic fetch → decide → write sequence.
//! [`reconcile`] adapts it to kube-runtime: it maps each result onto an
//! [`Action`], records metrics and publishes Events.

use crate::controller::reconciler::decide::{decide, ReconcileOutcome, SecretRef};
use crate::controller::reconciler::types::{Disposition, EventOutcome, Reconciler, ReconcilerError};
use crate::observability::events::{actions, reasons};
use crate::observability::metrics;
use crate::store::{SecretStore, StoreError};
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::events::EventType;
use kube::Resource;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Handle one event for a secret: fetch its latest state, decide, and write
/// `ca.crt` when the decision says so.
///
/// A secret deleted before it could be fetched is not an error.
///
/// # Errors
///
/// [`ReconcilerError::InvalidChain`] when `tls.crt` is malformed (nothing is
/// written), or [`ReconcilerError::Store`] with the store's error unchanged.
pub async fn on_secret_event<S>(
    store: &S,
    secret: &SecretRef,
) -> Result<EventOutcome, ReconcilerError>
where
    S: SecretStore + ?Sized,
{
    debug!(secret = %secret, "Evaluating secret...");
    let view = match store.fetch(secret).await {
        Ok(view) => view,
        Err(StoreError::NotFound(_)) => {
            debug!(secret = %secret, "Secret no longer exists, nothing to do.");
            return Ok(EventOutcome::Gone);
        }
        Err(e) => return Err(e.into()),
    };

    match decide(secret, &view) {
        ReconcileOutcome::Unchanged(reason) => Ok(EventOutcome::Unchanged(reason)),
        ReconcileOutcome::Failed(source) => Err(ReconcilerError::InvalidChain {
            secret: secret.clone(),
            source,
        }),
        ReconcileOutcome::Updated(ca_crt) => {
            store
                .write_ca(secret, view.resource_version.as_deref(), &ca_crt)
                .await?;
            info!(secret = %secret, "Updated the ca.crt of the TLS secret.");
            Ok(EventOutcome::Updated)
        }
    }
}

/// kube-runtime reconcile function for `Secret` objects
///
/// The watched object only tells us which secret changed; its state is
/// re-read through the store so decisions never run on a stale cache entry.
///
/// # Errors
///
/// Transient store failures are returned so the error policy can back off.
/// Invalid chains and write conflicts are handled here.
pub async fn reconcile(obj: Arc<Secret>, ctx: Arc<Reconciler>) -> Result<Action, ReconcilerError> {
    let secret = SecretRef::from_secret(&obj);
    let span = tracing::info_span!(
        "controller.reconcile",
        secret.namespace = secret.namespace.as_str(),
        secret.name = secret.name.as_str(),
    );

    async move {
        metrics::increment_reconciliations();
        let start = Instant::now();
        let result = on_secret_event(ctx.store.as_ref(), &secret).await;
        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        match result {
            Ok(EventOutcome::Updated) => {
                metrics::increment_ca_updates();
                ctx.clear_backoff(&secret);
                ctx.events
                    .publish(
                        &obj.object_ref(&()),
                        EventType::Normal,
                        reasons::CA_COMPLETED,
                        actions::RECONCILE,
                        Some("Set ca.crt to the last certificate of the tls.crt chain".to_string()),
                    )
                    .await;
                Ok(Action::await_change())
            }
            Ok(EventOutcome::Unchanged(reason)) => {
                metrics::increment_skipped(reason.as_str());
                ctx.clear_backoff(&secret);
                Ok(Action::await_change())
            }
            Ok(EventOutcome::Gone) => {
                ctx.clear_backoff(&secret);
                Ok(Action::await_change())
            }
            Err(e) if e.disposition() == Disposition::Surface => {
                // Retrying cannot fix stored data; the next edit of the secret triggers a new attempt
                warn!(error = %e, "Leaving TLS secret untouched");
                metrics::increment_invalid_chains();
                ctx.clear_backoff(&secret);
                ctx.events
                    .publish(
                        &obj.object_ref(&()),
                        EventType::Warning,
                        reasons::INVALID_CERTIFICATE_CHAIN,
                        actions::RECONCILE,
                        Some(e.to_string()),
                    )
                    .await;
                Ok(Action::await_change())
            }
            Err(e) if e.is_conflict() => {
                info!(error = %e, "Secret changed while updating, retrying with fresh state");
                metrics::increment_write_conflicts();
                metrics::increment_requeues_total("conflict");
                Ok(Action::requeue(ctx.config.conflict_requeue_duration()))
            }
            Err(e) => Err(e),
        }
    }
    .instrument(span)
    .await
}
