use crate::core_network::data_channel::DataChannel;
use crate::helpers::send_response;
use crate::session::Session;
use crate::Config;
use log::{debug, error, info};
use std::net::Ipv4Addr;
use tokio::io::AsyncWrite;
use tokio::net::TcpListener;

/// Formats the 227 reply: address octets, then the port split as
/// `port / 256, port % 256`.
pub fn format_pasv_reply(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!(
        "227 Entering Passive Mode ({},{},{},{},{},{})\r\n",
        h1,
        h2,
        h3,
        h4,
        port / 256,
        port % 256
    )
}

pub fn format_epsv_reply(port: u16) -> String {
    format!("229 Entering Extended Passive Mode (|||{}|)\r\n", port)
}

/// Handles the PASV command.
pub async fn handle_pasv_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let pasv_ip = config.server.pasv_address;
    enter_passive_mode(writer, config, session, |port| format_pasv_reply(pasv_ip, port)).await
}

/// Handles the EPSV command. Any argument is ignored.
pub async fn handle_epsv_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    enter_passive_mode(writer, config, session, format_epsv_reply).await
}

/// Listens on the session's data port, advertises it, then blocks until the
/// client connects. The listener is dropped once a peer is accepted.
async fn enter_passive_mode<W, F>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    format_reply: F,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
    F: FnOnce(u16) -> String,
{
    session.close_data_channel().await;

    let listener = match TcpListener::bind((config.server.listen_address, session.data_port)).await
    {
        Ok(listener) => listener,
        Err(e) => {
            error!(
                "Could not listen on data port {}: {}",
                session.data_port, e
            );
            return send_response(writer, b"425 Can't open data connection.\r\n").await;
        }
    };
    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => {
            error!("Could not read passive listener address: {}", e);
            return send_response(writer, b"425 Can't open data connection.\r\n").await;
        }
    };

    let response = format_reply(port);
    send_response(writer, response.as_bytes()).await?;
    debug!("Passive listener set up on port {}", port);

    match DataChannel::accept(listener, config.server.data_timeout()).await {
        Ok(channel) => {
            info!("PASV connection established on port {}", port);
            session.set_data_channel(channel).await;
        }
        Err(e) => error!("Failed to accept data connection: {}", e),
    }
    Ok(())
}
