use crate::helpers::{format_multiline_reply, send_response};
use log::info;
use tokio::io::AsyncWrite;

const FEATURES: &[&str] = &[" EPRT", " EPSV"];

/// Handles the FEAT (Feature) FTP command.
pub async fn handle_feat_command<W>(writer: &mut W) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let mut lines = vec!["Extensions supported:"];
    lines.extend_from_slice(FEATURES);
    let response = format_multiline_reply(211, &lines, "END");

    info!("Responding to FEAT command with supported features.");
    send_response(writer, response.as_bytes()).await
}
