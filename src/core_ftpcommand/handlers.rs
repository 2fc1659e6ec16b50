use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_ftpcommand::{
    cwd, feat, list, mkd, noop, pass, pwd, quit, retr, rmd, stor, syst, type_, user,
};
use crate::core_network::{pasv, port};
use crate::helpers::send_response;
use crate::session::Session;
use crate::Config;
use log::warn;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tokio::io::AsyncWrite;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send + 'a>>;

/// A command handler: control writer, configuration, session and the
/// argument, all borrowed for the duration of one command.
pub type CommandHandler<W> =
    for<'a> fn(&'a mut W, &'a Config, &'a mut Session, Option<&'a str>) -> HandlerFuture<'a>;

pub type CommandHandlers<W> = HashMap<FtpCommand, CommandHandler<W>>;

pub fn initialize_command_handlers<W>() -> CommandHandlers<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut handlers: CommandHandlers<W> = HashMap::new();

    handlers.insert(FtpCommand::USER, |writer, config, session, arg| {
        Box::pin(user::handle_user_command(writer, config, session, arg))
    });
    handlers.insert(FtpCommand::PASS, |writer, config, session, arg| {
        Box::pin(pass::handle_pass_command(writer, config, session, arg))
    });
    handlers.insert(FtpCommand::QUIT, |writer, _config, session, _arg| {
        Box::pin(quit::handle_quit_command(writer, session))
    });
    handlers.insert(FtpCommand::PWD, |writer, _config, session, _arg| {
        Box::pin(pwd::handle_pwd_command(writer, session))
    });
    handlers.insert(FtpCommand::CWD, |writer, _config, session, arg| {
        Box::pin(cwd::handle_cwd_command(writer, session, arg))
    });
    handlers.insert(FtpCommand::CDUP, |writer, _config, session, _arg| {
        Box::pin(cwd::handle_cwd_command(writer, session, Some("..")))
    });
    handlers.insert(FtpCommand::LIST, |writer, _config, session, arg| {
        Box::pin(list::handle_list_command(writer, session, arg))
    });
    handlers.insert(FtpCommand::NOOP, |writer, _config, _session, _arg| {
        Box::pin(noop::handle_noop_command(writer))
    });
    handlers.insert(FtpCommand::MKD, |writer, _config, session, arg| {
        Box::pin(mkd::handle_mkd_command(writer, session, arg))
    });
    handlers.insert(FtpCommand::RMD, |writer, _config, session, arg| {
        Box::pin(rmd::handle_rmd_command(writer, session, arg))
    });
    handlers.insert(FtpCommand::RETR, |writer, config, session, arg| {
        Box::pin(retr::handle_retr_command(writer, config, session, arg))
    });
    handlers.insert(FtpCommand::STOR, |writer, config, session, arg| {
        Box::pin(stor::handle_stor_command(writer, config, session, arg))
    });
    handlers.insert(FtpCommand::TYPE, |writer, _config, session, arg| {
        Box::pin(type_::handle_type_command(writer, session, arg))
    });
    handlers.insert(FtpCommand::PORT, |writer, config, session, arg| {
        Box::pin(port::handle_port_command(writer, config, session, arg))
    });
    handlers.insert(FtpCommand::EPRT, |writer, config, session, arg| {
        Box::pin(port::handle_eprt_command(writer, config, session, arg))
    });
    handlers.insert(FtpCommand::PASV, |writer, config, session, _arg| {
        Box::pin(pasv::handle_pasv_command(writer, config, session))
    });
    handlers.insert(FtpCommand::EPSV, |writer, config, session, _arg| {
        Box::pin(pasv::handle_epsv_command(writer, config, session))
    });
    handlers.insert(FtpCommand::FEAT, |writer, _config, _session, _arg| {
        Box::pin(feat::handle_feat_command(writer))
    });
    handlers.insert(FtpCommand::SYST, |writer, _config, _session, _arg| {
        Box::pin(syst::handle_syst_command(writer))
    });

    handlers
}

/// Routes one parsed command to its handler. Every command produces exactly
/// one reply; an `Err` means the control connection itself failed.
pub async fn dispatch_command<W>(
    writer: &mut W,
    config: &Config,
    session: &mut Session,
    handlers: &CommandHandlers<W>,
    command: &Command,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let handler = FtpCommand::from_str(&command.verb).and_then(|cmd| handlers.get(&cmd));
    match handler {
        Some(handler) => handler(writer, config, session, command.arg.as_deref()).await,
        None => {
            warn!("Unknown command: {:?}", command.verb);
            send_response(writer, b"501 Unknown command\r\n").await
        }
    }
}
