//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `ca_completer_reconciliations_total` - Total number of reconciliations
//! - `ca_completer_reconciliation_errors_total` - Reconciliations that returned an error
//! - `ca_completer_reconciliation_duration_seconds` - Duration of reconciliations
//! - `ca_completer_ca_updates_total` - Secrets whose `ca.crt` was filled in
//! - `ca_completer_invalid_chains_total` - Secrets with a malformed `tls.crt`
//! - `ca_completer_skipped_total{reason}` - Secrets left untouched, by guard
//! - `ca_completer_write_conflicts_total` - Writes rejected for concurrent modification
//! - `ca_completer_requeues_total{reason}` - Requeues, by trigger

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "ca_completer_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "ca_completer_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "ca_completer_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static CA_UPDATES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "ca_completer_ca_updates_total",
        "Total number of TLS secrets whose ca.crt was filled in",
    )
    .expect("Failed to create CA_UPDATES_TOTAL metric - this should never happen")
});

static INVALID_CHAINS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "ca_completer_invalid_chains_total",
        "Total number of TLS secrets with a malformed tls.crt",
    )
    .expect("Failed to create INVALID_CHAINS_TOTAL metric - this should never happen")
});

static SKIPPED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "ca_completer_skipped_total",
            "Total number of secrets left untouched, by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create SKIPPED_TOTAL metric - this should never happen")
});

static WRITE_CONFLICTS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "ca_completer_write_conflicts_total",
        "Total number of ca.crt writes rejected because the secret changed",
    )
    .expect("Failed to create WRITE_CONFLICTS_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "ca_completer_requeues_total",
            "Total number of requeues, by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

/// Register all metrics with the registry served on `/metrics`
///
/// # Errors
///
/// Fails if called more than once per process.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CA_UPDATES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INVALID_CHAINS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WRITE_CONFLICTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_ca_updates() {
    CA_UPDATES_TOTAL.inc();
}

pub fn increment_invalid_chains() {
    INVALID_CHAINS_TOTAL.inc();
}

pub fn increment_skipped(reason: &str) {
    SKIPPED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn increment_write_conflicts() {
    WRITE_CONFLICTS_TOTAL.inc();
}

pub fn increment_requeues_total(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}
