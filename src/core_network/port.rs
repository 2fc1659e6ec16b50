use crate::core_error::FtpError;
use crate::core_network::data_channel::DataChannel;
use crate::helpers::send_response;
use crate::session::Session;
use crate::Config;
use log::{error, info, warn};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::AsyncWrite;

const EPRT_IPV4: &str = "1";
const EPRT_IPV6: &str = "2";

/// Parses `a,b,c,d,p1,p2` into `a.b.c.d:(p1*256+p2)`.
pub fn parse_port_argument(arg: &str) -> Result<SocketAddr, FtpError> {
    let fields = arg
        .trim()
        .split(',')
        .map(|field| field.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| FtpError::InvalidArgument(format!("{}: {}", arg, e)))?;

    let [a, b, c, d, p1, p2] = fields[..] else {
        return Err(FtpError::InvalidArgument(format!(
            "expected 6 fields, got {}",
            fields.len()
        )));
    };

    let port = u16::from(p1) << 8 | u16::from(p2);
    if port == 0 {
        return Err(FtpError::InvalidArgument("port 0".to_string()));
    }
    Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(a, b, c, d)), port))
}

/// Parses `|proto|address|port|`. The first character is the delimiter;
/// protocol 1 is IPv4 and 2 is IPv6.
pub fn parse_eprt_argument(arg: &str) -> Result<SocketAddr, FtpError> {
    let arg = arg.trim();
    let delimiter = arg
        .chars()
        .next()
        .filter(|c| c.is_ascii_graphic())
        .ok_or_else(|| FtpError::InvalidArgument(arg.to_string()))?;

    let fields: Vec<&str> = arg[delimiter.len_utf8()..].split(delimiter).collect();
    let [proto, address, port, ""] = fields[..] else {
        return Err(FtpError::InvalidArgument(arg.to_string()));
    };

    let ip = match proto {
        EPRT_IPV4 => address.parse::<Ipv4Addr>().map(IpAddr::V4),
        EPRT_IPV6 => address.parse::<Ipv6Addr>().map(IpAddr::V6),
        other => return Err(FtpError::UnsupportedProtocol(other.to_string())),
    }
    .map_err(|e| FtpError::InvalidArgument(format!("{}: {}", address, e)))?;

    let port = port
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| FtpError::InvalidArgument(format!("bad port {}", port)))?;

    Ok(SocketAddr::new(ip, port))
}

/// Handles the PORT (Active Mode) FTP command.
pub async fn handle_port_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let parsed = arg
        .ok_or_else(|| FtpError::InvalidArgument("missing argument".to_string()))
        .and_then(parse_port_argument);
    enter_active_mode(writer, config, session, parsed).await
}

/// Handles the EPRT (Extended Active Mode) FTP command.
pub async fn handle_eprt_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let parsed = arg
        .ok_or_else(|| FtpError::InvalidArgument("missing argument".to_string()))
        .and_then(parse_eprt_argument);
    enter_active_mode(writer, config, session, parsed).await
}

async fn enter_active_mode<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    parsed: Result<SocketAddr, FtpError>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let addr = match parsed {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Rejected active mode argument: {}", e);
            return send_response(writer, e.to_ftp_response().as_bytes()).await;
        }
    };

    session.close_data_channel().await;
    info!("Active mode requested to {}", addr);

    match DataChannel::connect(addr, config.server.data_timeout()).await {
        Ok(channel) => {
            session.set_data_channel(channel).await;
            send_response(writer, b"200 Command OK\r\n").await
        }
        Err(e) => {
            error!("Failed to connect to client {}: {}", addr, e);
            send_response(writer, b"425 Can't open data connection.\r\n").await
        }
    }
}
