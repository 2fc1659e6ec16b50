/// One parsed control line: the verb, upper-cased, and whatever followed
/// the first space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub arg: Option<String>,
}

impl Command {
    /// Splits at the first space. Never fails; an empty line gives an empty
    /// verb, which dispatches to the unknown-command reply.
    pub fn parse(line: &str) -> Self {
        match line.split_once(' ') {
            Some((verb, arg)) => Self {
                verb: verb.to_ascii_uppercase(),
                arg: Some(arg.to_string()),
            },
            None => Self {
                verb: line.to_ascii_uppercase(),
                arg: None,
            },
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    PWD,
    LIST,
    CWD,
    CDUP,
    NOOP,
    MKD,
    RMD,
    RETR,
    STOR,
    PORT,
    EPRT,
    PASV,
    EPSV,
    FEAT,
    SYST,
    TYPE,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "LIST" | "NLST" => Some(FtpCommand::LIST),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "NOOP" => Some(FtpCommand::NOOP),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "PORT" => Some(FtpCommand::PORT),
            "EPRT" => Some(FtpCommand::EPRT),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "FEAT" => Some(FtpCommand::FEAT),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            _ => None,
        }
    }
}
