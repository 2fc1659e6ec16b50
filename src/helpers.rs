use anyhow::{Context, Result};
use log::{error, info};
use std::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Sends a response to the client.
pub async fn send_response<W>(writer: &mut W, message: &[u8]) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

/// Formats a single-line reply, `<code> <text>\r\n`.
pub fn format_reply(code: u16, text: &str) -> String {
    format!("{} {}\r\n", code, text)
}

/// Formats a multi-line reply: every line but the last is `<code>-<line>`.
pub fn format_multiline_reply(code: u16, lines: &[&str], last: &str) -> String {
    let mut reply = String::new();
    for line in lines {
        reply.push_str(&format!("{}-{}\r\n", code, line));
    }
    reply.push_str(&format_reply(code, last));
    reply
}

pub async fn send_reply<W>(writer: &mut W, code: u16, text: &str) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    send_response(writer, format_reply(code, text).as_bytes()).await
}

pub fn load_banner(path: &str) -> Result<String> {
    let banner = fs::read_to_string(path)
        .map_err(|e| {
            error!("Failed to read banner file: {}: {}", path, e);
            anyhow::Error::new(e)
        })
        .with_context(|| format!("Failed to read banner file: {}", path))?;

    if banner.trim().is_empty() {
        error!("Banner file is empty: {}", path);
        return Err(anyhow::Error::msg("Banner file is empty."));
    }

    info!("Banner file loaded successfully: {}", path);
    Ok(banner)
}
