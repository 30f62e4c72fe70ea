//! # Kubernetes Secret Store
//!
//! `SecretStore` backed by the Kubernetes API.
//!
//! Writes are JSON merge patches touching only `data."ca.crt"`. The fetched
//! `resourceVersion` rides along in the patch, so the API server rejects the
//! write with 409 Conflict when another writer got there first.

use super::{SecretStore, StoreError};
use crate::constants::CA_CRT_KEY;
use crate::controller::reconciler::decide::{SecretRef, SecretView};
use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::json;
use tracing::debug;

#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
    field_manager: String,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore")
            .field("field_manager", &self.field_manager)
            .finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn api(&self, secret: &SecretRef) -> Api<Secret> {
        Api::namespaced(self.client.clone(), &secret.namespace)
    }
}

/// Build the merge patch that sets `ca.crt` (and pins the resource version, if known)
#[must_use]
pub fn ca_patch(resource_version: Option<&str>, ca_crt: &[u8]) -> serde_json::Value {
    let mut data = serde_json::Map::new();
    data.insert(CA_CRT_KEY.to_string(), json!(STANDARD.encode(ca_crt)));
    let mut patch = json!({ "data": data });
    if let Some(rv) = resource_version {
        patch["metadata"] = json!({ "resourceVersion": rv });
    }
    patch
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn fetch(&self, secret: &SecretRef) -> Result<SecretView, StoreError> {
        match self.api(secret).get(&secret.name).await {
            Ok(obj) => Ok(SecretView::from(&obj)),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                Err(StoreError::NotFound(secret.clone()))
            }
            Err(e) => Err(StoreError::Backend(
                anyhow::Error::new(e).context(format!("Failed to get secret {secret}")),
            )),
        }
    }

    async fn write_ca(
        &self,
        secret: &SecretRef,
        resource_version: Option<&str>,
        ca_crt: &[u8],
    ) -> Result<(), StoreError> {
        let patch = ca_patch(resource_version, ca_crt);
        let params = PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..PatchParams::default()
        };

        debug!(secret = %secret, resource_version, "Patching ca.crt");
        match self
            .api(secret)
            .patch(&secret.name, &params, &Patch::Merge(&patch))
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(api_err)) if api_err.code == 409 => {
                Err(StoreError::Conflict(secret.clone()))
            }
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                Err(StoreError::NotFound(secret.clone()))
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to patch ca.crt of secret {secret}"))
                .map_err(StoreError::Backend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_sets_only_ca_crt() {
        let patch = ca_patch(None, b"pem");
        assert_eq!(patch, json!({ "data": { "ca.crt": "cGVt" } }));
    }

    #[test]
    fn test_patch_pins_resource_version() {
        let patch = ca_patch(Some("1234"), b"pem");
        assert_eq!(patch["metadata"]["resourceVersion"], "1234");
        assert_eq!(patch["data"]["ca.crt"], "cGVt");
        assert_eq!(patch["data"].as_object().map(serde_json::Map::len), Some(1));
    }
}
