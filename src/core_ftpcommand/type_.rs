use crate::core_transfer::TransferType;
use crate::helpers::{send_reply, send_response};
use crate::session::Session;
use log::{info, warn};
use tokio::io::AsyncWrite;

/// Handles the TYPE FTP command.
///
/// `A` selects ASCII and `I` selects binary, in either case. Any other type
/// is refused and the current one is kept.
pub async fn handle_type_command<W>(
    writer: &mut W,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(arg) = arg.filter(|arg| !arg.trim().is_empty()) else {
        return send_response(writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    };

    match TransferType::from_type_arg(arg) {
        Some(transfer_type) => {
            session.transfer_type = transfer_type;
            info!("Transfer type set to {}", transfer_type);
            send_reply(writer, 200, &format!("Type set to {}", transfer_type.code())).await
        }
        None => {
            warn!("Unsupported TYPE argument: {}", arg);
            send_response(writer, b"504 Command not implemented for that parameter.\r\n").await
        }
    }
}
