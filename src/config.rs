use crate::constants::{
    DEFAULT_DOWNLOAD_BUFFER_SIZE, DEFAULT_LISTEN_PORT, DEFAULT_UPLOAD_BUFFER_SIZE,
};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: IpAddr,
    pub listen_port: u16,
    pub pasv_address: Ipv4Addr, // Address advertised to clients in PASV replies
    pub chroot_dir: String,
    pub min_homedir: Option<String>, // Start directory, relative to chroot_dir
    pub banner_file: Option<String>,
    pub upload_buffer_size: Option<usize>, // Optional to allow default value
    pub download_buffer_size: Option<usize>, // Optional to allow default value
    pub idle_timeout_secs: Option<u64>,
    pub data_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: Option<String>,
    pub password_hash: Option<String>, // bcrypt, wins over `password`
    pub anonymous: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: DEFAULT_LISTEN_PORT,
            pasv_address: Ipv4Addr::LOCALHOST,
            chroot_dir: String::from("/var/ftp"),
            min_homedir: None,
            banner_file: None,
            upload_buffer_size: Some(DEFAULT_UPLOAD_BUFFER_SIZE),
            download_buffer_size: Some(DEFAULT_DOWNLOAD_BUFFER_SIZE),
            idle_timeout_secs: None,
            data_timeout_secs: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: String::from("ftpuser"),
            password: None,
            password_hash: None,
            anonymous: false,
        }
    }
}

impl ServerConfig {
    pub fn upload_buffer_size(&self) -> usize {
        self.upload_buffer_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_UPLOAD_BUFFER_SIZE)
    }

    pub fn download_buffer_size(&self) -> usize {
        self.download_buffer_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DOWNLOAD_BUFFER_SIZE)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn data_timeout(&self) -> Option<Duration> {
        self.data_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  PASV Address: {}", config.server.pasv_address);
    info!("  Chroot Directory: {}", config.server.chroot_dir);
    if let Some(home) = &config.server.min_homedir {
        info!("  Minimum Home Directory: {}", home);
    }
    info!(
        "  Upload Buffer Size: {} KB",
        config.server.upload_buffer_size() / 1024
    );
    info!(
        "  Download Buffer Size: {} KB",
        config.server.download_buffer_size() / 1024
    );
    info!("  User: {}", config.auth.username);
    info!("  Anonymous Login: {}", config.auth.anonymous);
}
