//! # RBAC
//!
//! The ClusterRole the controller needs: read and update secrets, publish events.

use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule};
use kube::api::ObjectMeta;

fn rule(api_group: &str, resource: &str, verbs: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![api_group.to_string()]),
        resources: Some(vec![resource.to_string()]),
        verbs: verbs.iter().map(ToString::to_string).collect(),
        ..PolicyRule::default()
    }
}

/// Build the ClusterRole for a controller deployed under `name`
#[must_use]
pub fn cluster_role(name: &str) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        rules: Some(vec![
            rule("", "secrets", &["get", "list", "watch", "update", "patch"]),
            rule("events.k8s.io", "events", &["create", "patch"]),
            rule("", "events", &["create", "patch"]),
        ]),
        ..ClusterRole::default()
    }
}

/// Render the ClusterRole as a YAML manifest
///
/// # Errors
///
/// Fails only if YAML serialization fails.
pub fn cluster_role_yaml(name: &str) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&cluster_role(name))
}
