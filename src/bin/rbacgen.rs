//! # RBAC Generator
//!
//! Prints the ClusterRole the controller needs.
//!
//! ```bash
//! cargo run --bin rbacgen > config/rbac/clusterrole.yaml
//! cargo run --bin rbacgen -- my-completer | kubectl apply -f -
//! ```

use anyhow::{Context, Result};
use ca_completer::constants::DEFAULT_CONTROLLER_NAME;
use ca_completer::rbac::cluster_role_yaml;

fn main() -> Result<()> {
    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONTROLLER_NAME.to_string());
    let yaml = cluster_role_yaml(&name).context("Failed to render ClusterRole")?;
    print!("{yaml}");
    Ok(())
}
