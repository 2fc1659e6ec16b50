use log::trace;
use std::fmt;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Framing applied to file contents on the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    #[default]
    Ascii,
    Binary,
}

impl TransferType {
    /// Parses the argument of `TYPE`. Only the first token is significant,
    /// so `A N` selects ASCII.
    pub fn from_type_arg(arg: &str) -> Option<Self> {
        match arg.split_whitespace().next()?.to_ascii_uppercase().as_str() {
            "A" => Some(TransferType::Ascii),
            "I" => Some(TransferType::Binary),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            TransferType::Ascii => 'A',
            TransferType::Binary => 'I',
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Ascii => write!(f, "ASCII"),
            TransferType::Binary => write!(f, "binary"),
        }
    }
}

/// Copies raw bytes in `buffer_size` chunks until end of stream.
pub async fn copy_binary<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read]).await?;
        total += bytes_read as u64;
    }
    writer.flush().await?;
    trace!("Binary copy finished, {} bytes", total);
    Ok(total)
}

/// Copies line by line, replacing each line's terminator (`\n` or `\r\n`)
/// with `eol`. A final line without terminator still gets one.
///
/// Returns the number of bytes written.
pub async fn copy_ascii<R, W>(reader: &mut R, writer: &mut W, eol: &[u8]) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut total = 0u64;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        writer.write_all(&line).await?;
        writer.write_all(eol).await?;
        total += (line.len() + eol.len()) as u64;
    }
    writer.flush().await?;
    trace!("ASCII copy finished, {} bytes", total);
    Ok(total)
}
