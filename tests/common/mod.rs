//! Shared fixtures and an in-memory `SecretStore` for integration tests.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use async_trait::async_trait;
use ca_completer::constants::{CA_CRT_KEY, TLS_CRT_KEY, TLS_SECRET_TYPE};
use ca_completer::prelude::*;
use k8s_openapi::api::core::v1::{ObjectReference, Secret};
use kube::api::ObjectMeta;
use kube::runtime::events::EventType;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Leaf certificate of a real Let's Encrypt chain
pub const LEAF: &str = include_str!("../fixtures/leaf.pem");
/// Intermediate that issued `LEAF`
pub const ISSUER: &str = include_str!("../fixtures/issuer.pem");

pub fn secret_ref() -> SecretRef {
    SecretRef::new("test-namespace", "test-secret")
}

/// Watched object for `secret_ref()`; `reconcile` only reads its identity
pub fn secret_object() -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some("test-secret".to_string()),
            namespace: Some("test-namespace".to_string()),
            ..ObjectMeta::default()
        },
        ..Secret::default()
    }
}

pub fn tls_view(ca_crt: Option<&str>, tls_crt: Option<&str>) -> SecretView {
    typed_view(TLS_SECRET_TYPE, ca_crt, tls_crt)
}

pub fn typed_view(secret_type: &str, ca_crt: Option<&str>, tls_crt: Option<&str>) -> SecretView {
    let mut data = BTreeMap::new();
    if let Some(ca) = ca_crt {
        data.insert(CA_CRT_KEY.to_string(), ca.as_bytes().to_vec());
    }
    if let Some(tls) = tls_crt {
        data.insert(TLS_CRT_KEY.to_string(), tls.as_bytes().to_vec());
    }
    SecretView {
        resource_version: Some("1".to_string()),
        secret_type: Some(secret_type.to_string()),
        data: Some(data),
    }
}

/// In-memory secret store with resource-version checks
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<SecretRef, SecretView>>,
    pub writes: AtomicUsize,
    pub fail_fetch: AtomicBool,
}

impl MemorySecretStore {
    pub fn with_secret(secret: SecretRef, view: SecretView) -> Self {
        let store = Self::default();
        store.insert(secret, view);
        store
    }

    pub fn insert(&self, secret: SecretRef, view: SecretView) {
        self.secrets.lock().unwrap().insert(secret, view);
    }

    pub fn get(&self, secret: &SecretRef) -> Option<SecretView> {
        self.secrets.lock().unwrap().get(secret).cloned()
    }

    /// Simulate another writer touching the secret
    pub fn bump_resource_version(&self, secret: &SecretRef) {
        if let Some(view) = self.secrets.lock().unwrap().get_mut(secret) {
            view.resource_version = Some(next_version(view.resource_version.as_deref()));
        }
    }
}

fn next_version(current: Option<&str>) -> String {
    let n: u64 = current.and_then(|v| v.parse().ok()).unwrap_or(0);
    (n + 1).to_string()
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn fetch(&self, secret: &SecretRef) -> Result<SecretView, StoreError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("connection refused")));
        }
        self.get(secret)
            .ok_or_else(|| StoreError::NotFound(secret.clone()))
    }

    async fn write_ca(
        &self,
        secret: &SecretRef,
        resource_version: Option<&str>,
        ca_crt: &[u8],
    ) -> Result<(), StoreError> {
        let mut secrets = self.secrets.lock().unwrap();
        let view = secrets
            .get_mut(secret)
            .ok_or_else(|| StoreError::NotFound(secret.clone()))?;
        if resource_version.is_some() && resource_version != view.resource_version.as_deref() {
            return Err(StoreError::Conflict(secret.clone()));
        }
        view.data
            .get_or_insert_with(BTreeMap::new)
            .insert(CA_CRT_KEY.to_string(), ca_crt.to_vec());
        view.resource_version = Some(next_version(view.resource_version.as_deref()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store that lets another writer sneak in between fetch and write
#[derive(Debug, Default)]
pub struct RacingSecretStore {
    pub inner: MemorySecretStore,
}

#[async_trait]
impl SecretStore for RacingSecretStore {
    async fn fetch(&self, secret: &SecretRef) -> Result<SecretView, StoreError> {
        let view = self.inner.fetch(secret).await;
        self.inner.bump_resource_version(secret);
        view
    }

    async fn write_ca(
        &self,
        secret: &SecretRef,
        resource_version: Option<&str>,
        ca_crt: &[u8],
    ) -> Result<(), StoreError> {
        self.inner.write_ca(secret, resource_version, ca_crt).await
    }
}

/// A published Event, reduced to what tests assert on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub object: Option<String>,
    pub warning: bool,
    pub reason: String,
    pub note: Option<String>,
}

/// Publisher that keeps every Event in memory
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingEventPublisher {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(
        &self,
        resource_ref: &ObjectReference,
        type_: EventType,
        reason: &str,
        _action: &str,
        note: Option<String>,
    ) {
        self.events.lock().unwrap().push(RecordedEvent {
            object: resource_ref.name.clone(),
            warning: matches!(type_, EventType::Warning),
            reason: reason.to_string(),
            note,
        });
    }
}
