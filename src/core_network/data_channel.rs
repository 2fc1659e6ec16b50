use log::debug;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Active,
    Passive,
}

/// A connected data socket. Used for exactly one transfer, then closed.
#[derive(Debug)]
pub struct DataChannel {
    mode: DataMode,
    stream: TcpStream,
}

impl DataChannel {
    /// Active mode: connect out to the address the client advertised.
    pub async fn connect(addr: SocketAddr, limit: Option<Duration>) -> io::Result<Self> {
        let stream = with_limit(limit, TcpStream::connect(addr)).await?;
        debug!("Data connection - Active Mode - established to {}", addr);
        Ok(Self {
            mode: DataMode::Active,
            stream,
        })
    }

    /// Passive mode: wait for one peer, then drop the listener.
    pub async fn accept(listener: TcpListener, limit: Option<Duration>) -> io::Result<Self> {
        let (stream, peer) = with_limit(limit, listener.accept()).await?;
        debug!("Data connection - Passive Mode - accepted from {}", peer);
        Ok(Self {
            mode: DataMode::Passive,
            stream,
        })
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Flushes and shuts down the write side, then releases the socket.
    pub async fn close(mut self) -> io::Result<()> {
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        debug!("Data connection ({:?}) was closed", self.mode);
        Ok(())
    }
}

async fn with_limit<T, F>(limit: Option<Duration>, fut: F) -> io::Result<T>
where
    F: std::future::Future<Output = io::Result<T>>,
{
    match limit {
        Some(limit) => timeout(limit, fut)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "data connection timed out"))?,
        None => fut.await,
    }
}
