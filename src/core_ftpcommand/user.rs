use crate::core_auth::core_auth::Credentials;
use crate::helpers::send_response;
use crate::session::{AuthState, Session};
use crate::Config;
use log::{info, warn};
use tokio::io::AsyncWrite;

/// Handles the USER FTP command.
///
/// A recognized name moves the session to `UsernameEntered` and asks for a
/// password. An authenticated session stays authenticated.
///
/// # Arguments
///
/// * `writer` - The control connection.
/// * `config` - The server configuration holding the valid user.
/// * `session` - The session whose login state is updated.
/// * `arg` - The username provided by the client.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating whether the reply could be sent.
pub async fn handle_user_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let Some(username) = arg.map(str::trim).filter(|name| !name.is_empty()) else {
        warn!("USER command received with no arguments");
        return send_response(writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    };

    if session.auth.is_authenticated() {
        return send_response(writer, b"530 User already logged in\r\n").await;
    }

    if Credentials::new(&config.auth).accepts_user(username) {
        info!("Username accepted: {}", username);
        session.auth = AuthState::UsernameEntered {
            username: username.to_string(),
        };
        send_response(writer, b"331 User name okay, need password\r\n").await
    } else {
        warn!("Unknown username: {}", username);
        send_response(writer, b"530 Not logged in\r\n").await
    }
}
