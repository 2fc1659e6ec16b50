use crate::core_ftpcommand::utils::is_valid_directory_name;
use crate::helpers::send_response;
use crate::session::Session;
use log::{error, info, warn};
use tokio::io::AsyncWrite;

/// Handles the MKD (Make Directory) FTP command.
///
/// Creates `arg` inside the current directory. Only alphanumeric names are
/// accepted.
///
/// # Arguments
///
/// * `writer` - The control connection.
/// * `session` - The session providing the current directory.
/// * `arg` - The directory name to create.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating whether the reply could be sent.
pub async fn handle_mkd_command<W>(
    writer: &mut W,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(name) = arg.filter(|name| is_valid_directory_name(name)) else {
        warn!("MKD rejected invalid name: {:?}", arg);
        return send_response(writer, b"550 Invalid name\r\n").await;
    };

    let dir_path = session.current_dir.join(name);
    info!("Constructed directory path: {:?}", dir_path);

    match session.fs.create_directory(&dir_path) {
        Ok(()) => {
            info!("Directory created successfully: {:?}", dir_path);
            send_response(writer, b"250 Directory successfully created\r\n").await
        }
        Err(e) => {
            error!("Failed to create directory: {:?}, error: {}", dir_path, e);
            send_response(writer, b"550 Failed to create new directory\r\n").await
        }
    }
}
