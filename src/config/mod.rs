//! # Configuration
//!
//! Environment-driven configuration for the controller and its HTTP server.

pub mod controller;
pub mod server;

pub use controller::ControllerConfig;
pub use server::ServerConfig;
