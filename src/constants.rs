//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

/// Secret `type` for TLS keypairs
pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Data key holding the certificate chain
pub const TLS_CRT_KEY: &str = "tls.crt";

/// Data key holding the CA certificate
pub const CA_CRT_KEY: &str = "ca.crt";

/// Field selector restricting the watch to TLS secrets
pub const TLS_FIELD_SELECTOR: &str = "type=kubernetes.io/tls";

/// Default controller name (Event reporter and server-side field manager)
pub const DEFAULT_CONTROLLER_NAME: &str = "ca-completer";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default requeue delay after a write lost an optimistic-concurrency race (seconds)
pub const DEFAULT_CONFLICT_REQUEUE_SECS: u64 = 1;

/// Default Fibonacci backoff floor for transient errors (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;

/// Default Fibonacci backoff ceiling for transient errors (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "ca_completer=info";
