//! # Controller
//!
//! Core controller modules for the CA completer.
//!
//! - `backoff`: Fibonacci backoff for transient failures
//! - `chain`: PEM certificate chain parser
//! - `reconciler`: Decision procedure and reconciliation entry points
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod chain;
pub mod reconciler;
pub mod server;
