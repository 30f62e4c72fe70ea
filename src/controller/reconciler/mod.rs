//! # Reconciler
//!
//! Fills in the `ca.crt` of TLS secrets that carry a certificate chain.
//!
//! ## Reconciliation Flow
//!
//! 1. Fetch the latest state of the secret
//! 2. Decide (`decide`): skip, fail on a malformed chain, or derive `ca.crt`
//! 3. Write `ca.crt` back, pinned to the fetched resource version
//! 4. Publish an Event and update metrics

pub mod decide;
pub mod reconcile;
pub mod types;

// Re-export public API
pub use decide::{decide, ReconcileOutcome, SecretRef, SecretView, SkipReason};
pub use reconcile::{on_secret_event, reconcile};
pub use types::{Disposition, EventOutcome, Reconciler, ReconcilerError};
