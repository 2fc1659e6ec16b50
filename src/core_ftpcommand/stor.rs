use crate::constants::NATIVE_EOL;
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::finish_transfer;
use crate::core_transfer::{copy_ascii, copy_binary, TransferType};
use crate::helpers::send_response;
use crate::session::Session;
use crate::Config;
use log::{error, info, warn};
use std::io::ErrorKind;
use tokio::io::{AsyncWrite, BufReader};

/// Handles the STOR (Store File) FTP command.
///
/// Receives a new file into the current directory. Existing files are never
/// overwritten. The data connection is closed afterwards.
///
/// # Arguments
///
/// * `writer` - The control connection.
/// * `config` - The server configuration (upload buffer size).
/// * `session` - The session holding the data connection.
/// * `arg` - The name of the file to be stored.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating whether the replies could be sent.
pub async fn handle_stor_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(file) = arg.filter(|file| !file.is_empty()) else {
        warn!("STOR command received with no arguments");
        return send_response(writer, b"501 No filename given\r\n").await;
    };

    let file_path = session.resolve(file);
    if session.fs.exists(&file_path) {
        warn!("File already exists: {:?}", file_path);
        session.close_data_channel().await;
        return send_response(writer, b"550 File already exists\r\n").await;
    }

    let Some(mut channel) = session.take_data_channel() else {
        let response = FtpError::NoDataConnection.to_ftp_response();
        return send_response(writer, response.as_bytes()).await;
    };

    let mut target = match session.fs.open_for_write(&file_path) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to create file: {:?}, error: {}", file_path, e);
            if let Err(e) = channel.close().await {
                warn!("Could not close data connection: {}", e);
            }
            let response: &[u8] = match e.kind() {
                ErrorKind::AlreadyExists => b"550 File already exists\r\n",
                ErrorKind::PermissionDenied => b"550 Permission denied.\r\n",
                _ => b"550 Failed to create file\r\n",
            };
            return send_response(writer, response).await;
        }
    };

    let name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let response = format!(
        "150 Opening {} mode data connection for requested file {}\r\n",
        session.transfer_type, name
    );
    send_response(writer, response.as_bytes()).await?;
    info!("Receiving file: {:?}", file_path);

    let result = match session.transfer_type {
        TransferType::Binary => {
            copy_binary(
                channel.stream_mut(),
                &mut target,
                config.server.upload_buffer_size(),
            )
            .await
        }
        TransferType::Ascii => {
            copy_ascii(
                &mut BufReader::new(channel.stream_mut()),
                &mut target,
                NATIVE_EOL,
            )
            .await
        }
    };

    finish_transfer(writer, channel, result, &name).await
}
