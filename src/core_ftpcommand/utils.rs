use crate::constants::DIRECTORY_NAME_REGEX;
use crate::core_network::data_channel::DataChannel;
use crate::helpers::send_response;
use log::{error, info, warn};
use regex::Regex;
use std::sync::OnceLock;
use tokio::io::AsyncWrite;

/// Directory names for MKD/RMD: plain alphanumerics, so no separators and
/// no dot entries.
pub fn is_valid_directory_name(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(DIRECTORY_NAME_REGEX).ok())
        .as_ref()
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Drops leading option tokens such as `-la` that clients pass to LIST.
pub fn strip_list_options(arg: Option<&str>) -> Option<&str> {
    let mut rest = arg?.trim_start();
    while rest.starts_with('-') {
        rest = match rest.split_once(' ') {
            Some((_, tail)) => tail.trim_start(),
            None => "",
        };
    }
    Some(rest).filter(|rest| !rest.is_empty())
}

/// Closes the data channel, then sends the final reply for a transfer.
/// The channel is closed whatever the outcome.
pub async fn finish_transfer<W>(
    writer: &mut W,
    channel: DataChannel,
    result: std::io::Result<u64>,
    what: &str,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let mode = channel.mode();
    if let Err(e) = channel.close().await {
        warn!("Could not close data connection: {}", e);
    }

    match result {
        Ok(bytes) => {
            info!("Transfer of {} completed, {} bytes ({:?})", what, bytes, mode);
            send_response(writer, b"226 Transfer complete. Closing data connection.\r\n").await
        }
        Err(e) => {
            error!("Transfer of {} failed: {}", what, e);
            send_response(writer, b"426 Connection closed; transfer aborted.\r\n").await
        }
    }
}
