//! # Secret Store
//!
//! Read/write capability the reconciler is given to reach secrets.
//!
//! The reconciler only ever needs two things from the cluster: the current
//! state of one secret, and a way to set its `ca.crt`. Keeping that behind a
//! trait lets the reconciliation entry point run against the Kubernetes API
//! in production and against an in-memory map in tests.

use crate::controller::reconciler::decide::{SecretRef, SecretView};
use async_trait::async_trait;
use thiserror::Error;

pub mod kubernetes;

pub use kubernetes::KubeSecretStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret {0} not found")]
    NotFound(SecretRef),

    /// The secret changed since it was fetched
    #[error("secret {0} was modified concurrently")]
    Conflict(SecretRef),

    #[error("secret store error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Object-store capability for secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the current state of a secret
    async fn fetch(&self, secret: &SecretRef) -> Result<SecretView, StoreError>;

    /// Set `data["ca.crt"]`, leaving every other field untouched.
    ///
    /// When `resource_version` is given the write must fail with
    /// [`StoreError::Conflict`] if the secret has moved on since that version.
    async fn write_ca(
        &self,
        secret: &SecretRef,
        resource_version: Option<&str>,
        ca_crt: &[u8],
    ) -> Result<(), StoreError>;
}
