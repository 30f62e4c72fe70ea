//! CA Completer Library
//!
//! Fills in the `ca.crt` field of Kubernetes TLS secrets that carry a
//! certificate chain in `tls.crt` but no CA, using the last (top-most)
//! certificate of the chain.
//!
//! The last certificate is a structural choice: it is not verified to be
//! self-signed or to have issued the rest of the chain.
//!
//! ## Quick Start
//!
//! ```rust
//! use ca_completer::prelude::*;
//!
//! let chain = parse_cert_chain(b"").unwrap();
//! assert!(chain.is_empty());
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod prelude;
pub mod rbac;
pub mod runtime;
pub mod store;
