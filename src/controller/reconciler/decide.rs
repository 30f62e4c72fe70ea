//! # Decision Procedure
//!
//! Pure policy deciding what, if anything, to do with a secret.
//!
//! The guards run in a fixed order and each one is terminal:
//!
//! 1. Non-TLS secrets are ignored
//! 2. Secrets without data are ignored
//! 3. Secrets that already carry a `ca.crt` are ignored (the chain is not even parsed)
//! 4. Secrets with an empty `tls.crt` are ignored
//! 5. A `tls.crt` that does not split into whole PEM blocks fails
//! 6. A `tls.crt` that splits into zero blocks fails
//! 7. Otherwise the last block of the chain becomes the new `ca.crt`
//!
//! The last block is a structural heuristic. Nothing here verifies that it is
//! self-signed or that it actually issued the rest of the chain.

use crate::constants::{CA_CRT_KEY, TLS_CRT_KEY, TLS_SECRET_TYPE};
use crate::controller::chain::{parse_cert_chain, ChainError};
use k8s_openapi::api::core::v1::Secret;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Identity of a secret (namespace and name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl SecretRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build a reference from object metadata, defaulting the namespace like kubectl does
    #[must_use]
    pub fn from_secret(secret: &Secret) -> Self {
        Self::new(
            secret.metadata.namespace.as_deref().unwrap_or("default"),
            secret.metadata.name.as_deref().unwrap_or_default(),
        )
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Snapshot of the secret state the decision procedure reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretView {
    /// `metadata.resourceVersion` at fetch time, sent back on write
    pub resource_version: Option<String>,
    /// The secret `type` field
    pub secret_type: Option<String>,
    /// `data`, or `None` when the secret has no data map at all
    pub data: Option<BTreeMap<String, Vec<u8>>>,
}

impl SecretView {
    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.secret_type.as_deref() == Some(TLS_SECRET_TYPE)
    }

    /// Bytes of a data field; absent fields read as empty
    #[must_use]
    pub fn field(&self, key: &str) -> &[u8] {
        self.data
            .as_ref()
            .and_then(|data| data.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl From<&Secret> for SecretView {
    fn from(secret: &Secret) -> Self {
        Self {
            resource_version: secret.metadata.resource_version.clone(),
            secret_type: secret.type_.clone(),
            data: secret.data.as_ref().map(|data| {
                data.iter()
                    .map(|(key, value)| (key.clone(), value.0.clone()))
                    .collect()
            }),
        }
    }
}

/// Why a secret was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotTls,
    NoData,
    HasCa,
    EmptyTlsCrt,
}

impl SkipReason {
    /// Metric label value
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotTls => "not-tls",
            SkipReason::NoData => "no-data",
            SkipReason::HasCa => "has-ca",
            SkipReason::EmptyTlsCrt => "empty-tls-crt",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No mutation needed
    Unchanged(SkipReason),
    /// Persist this value as `ca.crt`, leaving every other field alone
    Updated(Vec<u8>),
    /// Malformed input; the secret must not be mutated
    Failed(ChainError),
}

/// Decide whether the secret needs its `ca.crt` filled in
#[must_use]
pub fn decide(secret: &SecretRef, view: &SecretView) -> ReconcileOutcome {
    if !view.is_tls() {
        info!(secret = %secret, "Skipping non-TLS secret.");
        return ReconcileOutcome::Unchanged(SkipReason::NotTls);
    }

    if view.data.is_none() {
        info!(secret = %secret, "Skipping TLS secret because it has no data.");
        return ReconcileOutcome::Unchanged(SkipReason::NoData);
    }

    if !view.field(CA_CRT_KEY).is_empty() {
        info!(secret = %secret, "Skipping TLS secret because it already has a ca.crt.");
        return ReconcileOutcome::Unchanged(SkipReason::HasCa);
    }

    let tls_crt = view.field(TLS_CRT_KEY);
    if tls_crt.is_empty() {
        info!(secret = %secret, "Skipping TLS secret because it has an empty tls.crt.");
        return ReconcileOutcome::Unchanged(SkipReason::EmptyTlsCrt);
    }

    let chain = match parse_cert_chain(tls_crt) {
        Ok(chain) => chain,
        Err(e) => {
            warn!(secret = %secret, error = %e, "TLS secret has a malformed tls.crt.");
            return ReconcileOutcome::Failed(e);
        }
    };

    let length = chain.len();
    match chain.into_top() {
        Some(top) => {
            info!(
                secret = %secret,
                length,
                "TLS secret has a certificate chain; using the last certificate as the ca.crt."
            );
            ReconcileOutcome::Updated(top.into_bytes())
        }
        None => {
            warn!(secret = %secret, "TLS secret has a tls.crt without any certificate.");
            ReconcileOutcome::Failed(ChainError::InvalidChain)
        }
    }
}
