//! # Types
//!
//! Core types for the reconciler.

use crate::config::ControllerConfig;
use crate::controller::backoff::BackoffState;
use crate::controller::chain::ChainError;
use crate::controller::reconciler::decide::{SecretRef, SkipReason};
use crate::observability::events::EventPublisher;
use crate::store::{SecretStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("secret {secret}: {source}")]
    InvalidChain {
        secret: SecretRef,
        #[source]
        source: ChainError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the caller should do with a failed reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Transient: fetch fresh state and try again
    Retry,
    /// Defect in the stored data: report it, do not requeue on a timer
    Surface,
}

impl ReconcilerError {
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self {
            ReconcilerError::InvalidChain { .. } => Disposition::Surface,
            ReconcilerError::Store(_) => Disposition::Retry,
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcilerError::Store(StoreError::Conflict(_)))
    }
}

/// Successful result of handling one secret event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Unchanged(SkipReason),
    /// `ca.crt` was written
    Updated,
    /// The secret no longer exists
    Gone,
}

/// Shared reconciliation context handed to every reconcile call
pub struct Reconciler {
    pub store: Arc<dyn SecretStore>,
    pub events: Arc<dyn EventPublisher>,
    pub config: ControllerConfig,
    // Backoff state per secret; lives in the error policy layer
    pub backoff_states: Mutex<HashMap<SecretRef, BackoffState>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn SecretStore>,
        events: Arc<dyn EventPublisher>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            store,
            events,
            config,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure for this secret and return `(delay_secs, error_count)`
    pub fn next_backoff(&self, secret: &SecretRef) -> (u64, u32) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                let state = states.entry(secret.clone()).or_insert_with(|| {
                    BackoffState::new(self.config.backoff_min_secs, self.config.backoff_max_secs)
                });
                state.increment_error();
                (state.backoff.next_backoff_seconds(), state.error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using maximum backoff", e);
                (self.config.backoff_max_secs, 0)
            }
        }
    }

    /// Drop any backoff state once the secret reconciles cleanly
    pub fn clear_backoff(&self, secret: &SecretRef) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(secret);
        }
    }
}
