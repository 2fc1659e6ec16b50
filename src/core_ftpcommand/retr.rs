use crate::constants::NETWORK_EOL;
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::finish_transfer;
use crate::core_transfer::{copy_ascii, copy_binary, TransferType};
use crate::helpers::send_response;
use crate::session::Session;
use crate::Config;
use log::{error, info, warn};
use tokio::io::{AsyncWrite, BufReader};

/// Handles the RETR (Retrieve) FTP command.
///
/// Streams a file from the current directory to the client using the
/// session's transfer type. The data connection is closed afterwards,
/// whether or not the transfer succeeded.
///
/// # Arguments
///
/// * `writer` - The control connection.
/// * `config` - The server configuration (download buffer size).
/// * `session` - The session holding the data connection.
/// * `arg` - The name of the file to retrieve.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating whether the replies could be sent.
pub async fn handle_retr_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(file) = arg.filter(|file| !file.is_empty()) else {
        warn!("RETR command received with no arguments");
        return send_response(writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    };

    let file_path = session.resolve(file);
    if !session.fs.is_file(&file_path) {
        warn!("File does not exist: {:?}", file_path);
        session.close_data_channel().await;
        return send_response(writer, b"550 File does not exist\r\n").await;
    }

    let Some(mut channel) = session.take_data_channel() else {
        let response = FtpError::NoDataConnection.to_ftp_response();
        return send_response(writer, response.as_bytes()).await;
    };

    let mut source = match session.fs.open_for_read(&file_path) {
        Ok(file) => file,
        Err(e) => {
            error!("File could not be opened: {:?}, error: {}", file_path, e);
            if let Err(e) = channel.close().await {
                warn!("Could not close data connection: {}", e);
            }
            return send_response(writer, b"550 File could not be opened\r\n").await;
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
    info!("Sending file: {:?}", file_path);

    let result = match session.transfer_type {
        TransferType::Binary => {
            copy_binary(
                &mut source,
                channel.stream_mut(),
                config.server.download_buffer_size(),
            )
            .await
        }
        TransferType::Ascii => {
            copy_ascii(&mut BufReader::new(source), channel.stream_mut(), NETWORK_EOL).await
        }
    };

    finish_transfer(writer, channel, result, &name).await
}
