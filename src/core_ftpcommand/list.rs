use crate::constants::NETWORK_EOL;
use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::{finish_transfer, strip_list_options};
use crate::helpers::send_response;
use crate::session::Session;
use log::{info, warn};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Handles the LIST and NLST FTP commands.
///
/// Sends one name per line over the data connection: the children of a
/// directory, or the name itself for a plain file. Needs a data connection
/// opened by PASV/EPSV/PORT/EPRT beforehand.
pub async fn handle_list_command<W>(
    writer: &mut W,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(mut channel) = session.take_data_channel() else {
        warn!("LIST without data connection");
        let response = FtpError::NoDataConnection.to_ftp_response();
        return send_response(writer, response.as_bytes()).await;
    };

    let target = match strip_list_options(arg) {
        Some(path) => session.resolve(path),
        None => session.current_dir.clone(),
    };

    let Some(names) = list_target(session, &target) else {
        warn!("Nothing to list at {:?}", target);
        if let Err(e) = channel.close().await {
            warn!("Could not close data connection: {}", e);
        }
        return send_response(writer, b"550 File does not exist.\r\n").await;
    };

    send_response(
        writer,
        b"125 Opening ASCII mode data connection for file list.\r\n",
    )
    .await?;
    info!("Listing {} entries of {:?}", names.len(), target);

    let stream = channel.stream_mut();
    let result = async {
        let mut written = 0u64;
        for name in &names {
            stream.write_all(name.as_bytes()).await?;
            stream.write_all(NETWORK_EOL).await?;
            written += (name.len() + NETWORK_EOL.len()) as u64;
        }
        stream.flush().await?;
        Ok::<u64, std::io::Error>(written)
    }
    .await;

    finish_transfer(writer, channel, result, "file list").await
}

fn list_target(session: &Session, target: &Path) -> Option<Vec<String>> {
    if session.fs.is_directory(target) {
        session.fs.list_names(target).ok()
    } else if session.fs.is_file(target) {
        target
            .file_name()
            .map(|name| vec![name.to_string_lossy().into_owned()])
    } else {
        None
    }
}
