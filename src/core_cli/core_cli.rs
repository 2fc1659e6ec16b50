use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "minftpd", about = "A minimal FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Control connection port, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory served to clients, overrides the configuration file
    #[arg(short, long)]
    pub root: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
