use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Initializes the global logger.
///
/// `RUST_LOG` takes precedence; otherwise the filter defaults to `info`,
/// or `debug` when running verbose.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(buf, "[{}] [{}] {}", timestamp, record.level(), record.args())
        })
        .init();
}

/// Masks the argument of commands that carry secrets before they are logged.
pub fn loggable_command(verb: &str, arg: Option<&str>) -> String {
    match (verb, arg) {
        ("PASS", Some(_)) => "PASS ****".to_string(),
        (verb, Some(arg)) => format!("{} {}", verb, arg),
        (verb, None) => verb.to_string(),
    }
}
