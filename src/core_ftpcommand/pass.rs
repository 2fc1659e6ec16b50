use crate::core_auth::core_auth::Credentials;
use crate::helpers::send_response;
use crate::session::{AuthState, Session};
use crate::Config;
use log::{info, warn};
use tokio::io::AsyncWrite;

/// Handles the PASS FTP command.
///
/// Only a session in `UsernameEntered` can log in. A wrong password leaves
/// the state where it was.
pub async fn handle_pass_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    arg: Option<&str>,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let username = match &session.auth {
        AuthState::Authenticated { .. } => {
            return send_response(writer, b"530 User already logged in\r\n").await;
        }
        AuthState::UsernameEntered { username } => username.clone(),
        AuthState::Unauthenticated => {
            warn!("PASS received before USER");
            return send_response(writer, b"530 Not logged in\r\n").await;
        }
    };

    let password = arg.unwrap_or_default();
    if Credentials::new(&config.auth).accepts_password(&username, password) {
        info!("User logged in: {}", username);
        session.auth = AuthState::Authenticated { username };
        send_response(writer, b"230 User logged in, proceed.\r\n").await
    } else {
        warn!("Wrong password for user: {}", username);
        send_response(writer, b"530 Not logged in\r\n").await
    }
}
