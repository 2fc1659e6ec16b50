use crate::helpers::{send_reply, send_response};
use crate::session::Session;
use log::{info, warn};
use tokio::io::AsyncWrite;

/// Handles the CWD FTP command (and CDUP, which arrives as `..`).
///
/// `..` drops one segment, `.` stays put, anything else is joined below the
/// current directory. The target must be an existing directory inside the
/// session root.
pub async fn handle_cwd_command<W>(
    writer: &mut W,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(arg) = arg.filter(|arg| !arg.is_empty()) else {
        warn!("CWD command received with no arguments");
        return send_response(writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    };

    let candidate = session.cwd_candidate(arg);
    if session.change_dir(candidate) {
        info!("Directory successfully changed to: {:?}", session.current_dir);
        let text = format!(
            "The current directory has been changed to {}",
            session.current_dir.display()
        );
        send_reply(writer, 250, &text).await
    } else {
        warn!("Failed to change directory with argument: {}", arg);
        send_response(writer, b"550 Requested action not taken. File unavailable.\r\n").await
    }
}
