//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `events`: Kubernetes Events published on reconciled secrets

pub mod events;
pub mod metrics;
