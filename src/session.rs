use crate::core_fs::{normalize_path, FileSystem};
use crate::core_network::data_channel::DataChannel;
use crate::core_transfer::TransferType;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Login progress. Only ever moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    UsernameEntered { username: String },
    Authenticated { username: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }
}

/// Per-connection state. Owned by the task serving the control connection.
pub struct Session {
    pub auth: AuthState,
    pub root_dir: PathBuf,
    pub current_dir: PathBuf,
    pub transfer_type: TransferType,
    pub data_channel: Option<DataChannel>,
    pub data_port: u16, // Passive listener port reserved for this session
    pub should_quit: bool,
    pub fs: Arc<dyn FileSystem>,
}

impl Session {
    /// `start_dir` falls back to the root unless it is an existing directory
    /// inside it.
    pub fn new(fs: Arc<dyn FileSystem>, start_dir: Option<PathBuf>, data_port: u16) -> Self {
        let root_dir = fs.root().to_path_buf();
        let current_dir = match start_dir.map(|dir| normalize_path(&dir)) {
            Some(dir) if dir.starts_with(&root_dir) && fs.is_directory(&dir) => dir,
            Some(dir) => {
                warn!("Start directory {:?} is unusable, using root", dir);
                root_dir.clone()
            }
            None => root_dir.clone(),
        };

        Self {
            auth: AuthState::Unauthenticated,
            root_dir,
            current_dir,
            transfer_type: TransferType::default(),
            data_channel: None,
            data_port,
            should_quit: false,
            fs,
        }
    }

    /// Joins `arg` below the current directory. Leading slashes are ignored,
    /// so the result is always a child path of `current_dir` before
    /// normalization.
    pub fn resolve(&self, arg: &str) -> PathBuf {
        let relative = arg.trim_start_matches('/');
        if relative.is_empty() {
            return self.current_dir.clone();
        }
        normalize_path(&self.current_dir.join(relative))
    }

    /// Computes where `CWD arg` would lead, without validating it.
    pub fn cwd_candidate(&self, arg: &str) -> PathBuf {
        match arg {
            ".." => self
                .current_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.current_dir.clone()),
            "." => self.current_dir.clone(),
            other => self.resolve(other),
        }
    }

    /// Commits `candidate` as the working directory when it is an existing
    /// directory that stays within the root. Returns whether it moved.
    pub fn change_dir(&mut self, candidate: PathBuf) -> bool {
        let long_enough = candidate.as_os_str().len() >= self.root_dir.as_os_str().len();
        if long_enough && candidate.starts_with(&self.root_dir) && self.fs.is_directory(&candidate) {
            debug!("Directory changed to: {:?}", candidate);
            self.current_dir = candidate;
            true
        } else {
            false
        }
    }

    /// Installs a freshly opened channel. Any channel still open is closed
    /// first, so there is never more than one.
    pub async fn set_data_channel(&mut self, channel: DataChannel) {
        self.close_data_channel().await;
        self.data_channel = Some(channel);
    }

    pub fn take_data_channel(&mut self) -> Option<DataChannel> {
        self.data_channel.take()
    }

    pub async fn close_data_channel(&mut self) {
        if let Some(channel) = self.data_channel.take() {
            if let Err(e) = channel.close().await {
                warn!("Could not close data connection: {}", e);
            }
        }
    }
}
