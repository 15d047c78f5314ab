//! # DCRL Node
//!
//! Usage: `node-runtime [config.toml]`
//!
//! Without an argument the path is taken from `DCRL_CONFIG`; without either
//! the defaults apply. `DCRL_*` variables override individual fields, and
//! `RUST_LOG` controls log filtering (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load configuration from file and environment.
fn load_config() -> Result<NodeConfig> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("DCRL_CONFIG"))
        .map(PathBuf::from);

    let mut config = match &path {
        Some(path) => NodeConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    config
        .apply_env()
        .context("Invalid DCRL_* environment override")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = load_config()?;
    let node = NodeRuntime::new(config)
        .start()
        .await
        .context("Node startup failed")?;

    info!(addr = %node.local_addr(), role = %node.role(), "Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    node.shutdown().await;
    Ok(())
}
