use crate::helpers::send_response;
use log::info;
use tokio::io::AsyncWrite;

/// Handles the SYST (System) FTP command.
pub async fn handle_syst_command<W>(writer: &mut W) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    info!("Responding to SYST command with system type.");
    send_response(writer, b"215 UNIX Type: L8\r\n").await
}
