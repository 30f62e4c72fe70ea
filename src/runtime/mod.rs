//! # Runtime
//!
//! Process-level wiring around the reconciler.
//!
//! - `initialization`: tracing, metrics, HTTP server, client and context setup
//! - `watch_loop`: kube-runtime controller over secrets
//! - `error_policy`: per-secret backoff for failed reconciliations

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
