use crate::config::log_config;
use crate::core_network::network;
use crate::Config;
use anyhow::{Context, Result};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration.
///
/// The root directory is canonicalized once here; every session is confined
/// to it.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let root = resolve_root(&config.server.chroot_dir)?;
    info!("Serving files from {:?}", root);

    if let Err(e) = network::start_server(Arc::new(config), root).await {
        error!("Failed to start server: {:#}", e);
        return Err(e);
    }

    Ok(())
}

pub fn resolve_root(chroot_dir: &str) -> Result<PathBuf> {
    let root = Path::new(chroot_dir)
        .canonicalize()
        .with_context(|| format!("Chroot directory is not accessible: {}", chroot_dir))?;
    if !root.is_dir() {
        anyhow::bail!("Chroot directory is not a directory: {}", chroot_dir);
    }
    Ok(root)
}
