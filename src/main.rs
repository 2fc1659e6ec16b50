mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_error;
mod core_fs;
mod core_ftpcommand;
mod core_log;
mod core_network;
mod core_transfer;
mod helpers;
mod server;
mod session;

use crate::config::Config;
use crate::core_cli::Cli;
use crate::core_log::logger::init_logger;
use anyhow::Result;
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration from the TOML file, or run on defaults
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from_file(path)?,
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(port) = args.port {
        config.server.listen_port = port;
    }
    if let Some(root) = args.root {
        config.server.chroot_dir = root;
    }

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
