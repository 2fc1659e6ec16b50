use crate::core_ftpcommand::utils::is_valid_directory_name;
use crate::helpers::send_response;
use crate::session::Session;
use log::{error, info, warn};
use tokio::io::AsyncWrite;

/// Handles the RMD (Remove Directory) FTP command.
///
/// Removes `arg` from the current directory if it exists and is a directory.
/// Only alphanumeric names are accepted.
pub async fn handle_rmd_command<W>(
    writer: &mut W,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(name) = arg.filter(|name| is_valid_directory_name(name)) else {
        warn!("RMD rejected invalid name: {:?}", arg);
        return send_response(writer, b"550 Invalid file name.\r\n").await;
    };

    let dir_path = session.current_dir.join(name);
    if !session.fs.is_directory(&dir_path) {
        warn!("Directory does not exist: {:?}", dir_path);
        return send_response(writer, b"550 Requested action not taken. File unavailable.\r\n")
            .await;
    }

    match session.fs.delete_directory(&dir_path) {
        Ok(()) => {
            info!("Directory removed successfully: {:?}", dir_path);
            send_response(writer, b"250 Directory was successfully removed\r\n").await
        }
        Err(e) => {
            error!("Failed to remove directory: {:?}, error: {}", dir_path, e);
            send_response(writer, b"550 Failed to remove directory.\r\n").await
        }
    }
}
