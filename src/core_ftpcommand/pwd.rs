use crate::helpers::send_response;
use crate::session::Session;
use tokio::io::AsyncWrite;

pub async fn handle_pwd_command<W>(writer: &mut W, session: &Session) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response = format!("257 \"{}\"\r\n", session.current_dir.display());

    // On Windows systems, the path will be formatted with Windows style separators ('\')
    // Most FTP clients expect normal UNIX separators ('/'), so we replace the separators here.
    #[cfg(windows)]
    let response = response.replace(std::path::MAIN_SEPARATOR, "/");

    send_response(writer, response.as_bytes()).await
}
