use crate::helpers::send_response;
use crate::session::Session;
use log::info;
use tokio::io::AsyncWrite;

/// Handles the QUIT FTP command.
///
/// Sends the closing reply and marks the session so the command loop ends.
pub async fn handle_quit_command<W>(writer: &mut W, session: &mut Session) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    info!("Received QUIT command. Closing connection.");
    session.should_quit = true;
    send_response(writer, b"221 Closing connection\r\n").await
}
