//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS, DEFAULT_CONFLICT_REQUEUE_SECS,
    DEFAULT_CONTROLLER_NAME,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Name used as Event reporter and field manager
    pub controller_name: String,
    /// Restrict the watch to a single namespace (all namespaces when unset)
    pub watch_namespace: Option<String>,
    /// Watch only `kubernetes.io/tls` secrets via a field selector.
    /// The decision procedure re-checks the type either way.
    pub tls_field_selector: bool,
    /// Requeue delay after a write conflict (seconds)
    pub conflict_requeue_secs: u64,
    /// Fibonacci backoff floor for transient errors (seconds)
    pub backoff_min_secs: u64,
    /// Fibonacci backoff ceiling for transient errors (seconds)
    pub backoff_max_secs: u64,
    /// Publish Kubernetes Events for completed and invalid secrets
    pub publish_events: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            controller_name: DEFAULT_CONTROLLER_NAME.to_string(),
            watch_namespace: None,
            tls_field_selector: true,
            conflict_requeue_secs: DEFAULT_CONFLICT_REQUEUE_SECS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            publish_events: true,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let backoff_min_secs = parse_or(&lookup, "BACKOFF_MIN_SECS", defaults.backoff_min_secs).max(1);
        Self {
            controller_name: lookup("CONTROLLER_NAME")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.controller_name),
            watch_namespace: lookup("WATCH_NAMESPACE").filter(|v| !v.is_empty()),
            tls_field_selector: bool_or(&lookup, "TLS_FIELD_SELECTOR", defaults.tls_field_selector),
            conflict_requeue_secs: parse_or(
                &lookup,
                "CONFLICT_REQUEUE_SECS",
                defaults.conflict_requeue_secs,
            ),
            backoff_min_secs,
            backoff_max_secs: parse_or(&lookup, "BACKOFF_MAX_SECS", defaults.backoff_max_secs)
                .max(backoff_min_secs),
            publish_events: bool_or(&lookup, "PUBLISH_EVENTS", defaults.publish_events),
        }
    }

    /// Get conflict requeue duration
    #[must_use]
    pub fn conflict_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.conflict_requeue_secs)
    }
}

/// Read a value and parse it, falling back to the default when unset or unparsable
pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a value as boolean (`true`/`1`/`yes`/`on`), falling back to the default when unset
pub(crate) fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(default, |v| {
        matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
    })
}
