use crate::core_fs::{FileSystem, LocalFileSystem};
use crate::core_ftpcommand::ftpcommand::Command;
use crate::core_ftpcommand::handlers::{dispatch_command, initialize_command_handlers};
use crate::core_log::logger::loggable_command;
use crate::helpers::{format_multiline_reply, format_reply, load_banner, send_response};
use crate::session::Session;
use crate::Config;
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Passive data port for the `sequence`-th session: the ports right above
/// the control port, wrapping inside `control_port + 1 ..= 65535`.
/// A control port of 0 (or 65535) leaves the choice to the OS.
pub fn session_data_port(control_port: u16, sequence: u64) -> u16 {
    if control_port == 0 || control_port == u16::MAX {
        return 0;
    }
    let span = u64::from(u16::MAX - control_port);
    control_port + 1 + (sequence % span) as u16
}

/// Hands out passive data ports to sessions. A port stays reserved while
/// its lease is alive; once the sequence wraps, ports still held by a live
/// session are skipped.
#[derive(Debug)]
pub struct DataPortAllocator {
    control_port: u16,
    sequence: Mutex<u64>,
    live: Arc<Mutex<HashSet<u16>>>,
}

/// Reservation of one data port. Dropping it frees the port.
#[derive(Debug)]
pub struct DataPortLease {
    port: u16,
    live: Arc<Mutex<HashSet<u16>>>,
}

impl DataPortLease {
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for DataPortLease {
    fn drop(&mut self) {
        if self.port == 0 {
            return;
        }
        if let Ok(mut live) = self.live.lock() {
            live.remove(&self.port);
        }
    }
}

impl DataPortAllocator {
    pub fn new(control_port: u16) -> Self {
        Self {
            control_port,
            sequence: Mutex::new(0),
            live: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Reserves the next free port. Falls back to 0 (OS-chosen) when every
    /// port above the control port is taken.
    pub fn lease(&self) -> DataPortLease {
        let start = match self.sequence.lock() {
            Ok(mut sequence) => {
                let current = *sequence;
                *sequence = current.wrapping_add(1);
                current
            }
            Err(_) => 0,
        };

        let port = match self.live.lock() {
            Ok(mut live) => self.first_free(start, &live).map_or(0, |port| {
                live.insert(port);
                port
            }),
            Err(_) => 0,
        };
        if port == 0 && session_data_port(self.control_port, start) != 0 {
            warn!("All data ports are in use, falling back to an ephemeral port");
        }

        DataPortLease {
            port,
            live: Arc::clone(&self.live),
        }
    }

    fn first_free(&self, start: u64, live: &HashSet<u16>) -> Option<u16> {
        if session_data_port(self.control_port, start) == 0 {
            return None;
        }
        let span = u64::from(u16::MAX - self.control_port);
        (0..span)
            .map(|offset| session_data_port(self.control_port, start.wrapping_add(offset)))
            .find(|port| !live.contains(port))
    }
}

pub async fn start_server(config: Arc<Config>, root: PathBuf) -> Result<()> {
    let address = (config.server.listen_address, config.server.listen_port);
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind control port {:?}", address))?;
    info!("Server listening on {}", listener.local_addr()?);

    serve(listener, config, root).await
}

/// Accept loop: one task per control connection, no state shared between
/// them beyond the read-only configuration.
pub async fn serve(listener: TcpListener, config: Arc<Config>, root: PathBuf) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new(root.clone()));
    let start_dir = config
        .server
        .min_homedir
        .as_ref()
        .map(|home| root.join(home.trim_start_matches('/')));
    let ports = DataPortAllocator::new(config.server.listen_port);

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Exception encountered on accept: {}", e);
                continue;
            }
        };

        let lease = ports.lease();
        info!("New connection from {:?}, data port {}", addr, lease.port());

        let session = Session::new(Arc::clone(&fs), start_dir.clone(), lease.port());
        let config = Arc::clone(&config);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, &config, session).await {
                error!("Connection error: {:?}", e);
            }
            drop(lease);
            info!("Connection closed for {:?}", addr);
        });
    }
}

pub async fn handle_connection(socket: TcpStream, config: &Config, session: Session) -> Result<()> {
    let (read_half, write_half) = socket.into_split();
    run_session(BufReader::new(read_half), write_half, config, session).await?;
    Ok(())
}

/// Runs the command loop of one session until QUIT, disconnect, idle
/// timeout or a control-connection error. The data channel is released on
/// every way out.
pub async fn run_session<R, W>(
    mut reader: R,
    mut writer: W,
    config: &Config,
    mut session: Session,
) -> Result<(), std::io::Error>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let handlers = initialize_command_handlers::<W>();
    send_greeting(&mut writer, config).await?;

    let mut line = Vec::new();
    loop {
        line.clear();
        let read = match config.server.idle_timeout() {
            Some(limit) => match timeout(limit, reader.read_until(b'\n', &mut line)).await {
                Ok(read) => read?,
                Err(_) => {
                    warn!("Control connection idle for {:?}, closing", limit);
                    send_response(&mut writer, b"421 Timeout.\r\n").await?;
                    break;
                }
            },
            None => reader.read_until(b'\n', &mut line).await?,
        };

        if read == 0 {
            info!("Client disconnected");
            break;
        }

        let text = String::from_utf8_lossy(&line);
        let command = Command::parse(text.trim_end_matches(&['\r', '\n'][..]));
        info!(
            "Received command: {}",
            loggable_command(&command.verb, command.arg.as_deref())
        );

        dispatch_command(&mut writer, config, &mut session, &handlers, &command).await?;
        if session.should_quit {
            break;
        }
    }

    session.close_data_channel().await;
    if let Err(e) = writer.shutdown().await {
        warn!("Could not shut down control connection: {}", e);
    }
    Ok(())
}

async fn send_greeting<W>(writer: &mut W, config: &Config) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let banner = config
        .server
        .banner_file
        .as_deref()
        .and_then(|path| match load_banner(path) {
            Ok(banner) => Some(banner),
            Err(e) => {
                warn!("Using default greeting: {:#}", e);
                None
            }
        });

    let response = match banner {
        Some(banner) => {
            let lines: Vec<&str> = banner.lines().collect();
            format_multiline_reply(220, &lines, "Service ready")
        }
        None => format_reply(220, "Welcome to the minftpd FTP-Server"),
    };
    send_response(writer, response.as_bytes()).await
}
