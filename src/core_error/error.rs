// Errors raised while interpreting command arguments
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported network protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("No data connection was established")]
    NoDataConnection,
}

impl FtpError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            FtpError::InvalidArgument(_) => {
                "501 Syntax error in parameters or arguments.\r\n".to_string()
            }
            FtpError::UnsupportedProtocol(_) => {
                "522 Network protocol not supported, use (1,2)\r\n".to_string()
            }
            FtpError::NoDataConnection => "425 No data connection was established\r\n".to_string(),
        }
    }
}
