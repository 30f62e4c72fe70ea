//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use ca_completer::prelude::*;
//! ```

pub use crate::config::{ControllerConfig, ServerConfig};
pub use crate::controller::chain::{parse_cert_chain, Certificate, CertificateChain, ChainError};
pub use crate::controller::reconciler::{
    decide, on_secret_event, reconcile, Disposition, EventOutcome, ReconcileOutcome, Reconciler,
    ReconcilerError, SecretRef, SecretView, SkipReason,
};
pub use crate::observability::events::{EventPublisher, NoopEventPublisher};
pub use crate::store::{SecretStore, StoreError};
