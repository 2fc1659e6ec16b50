// src/constants.rs

pub const DIRECTORY_NAME_REGEX: &str = r"^[A-Za-z0-9]+$";
pub const ANONYMOUS_USER: &str = "anonymous";

pub const DEFAULT_LISTEN_PORT: u16 = 1025;
pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024;

/// Line terminator used on the wire for ASCII transfers and listings.
pub const NETWORK_EOL: &[u8] = b"\r\n";

/// Line terminator written to local files on ASCII uploads.
#[cfg(windows)]
pub const NATIVE_EOL: &[u8] = b"\r\n";
#[cfg(not(windows))]
pub const NATIVE_EOL: &[u8] = b"\n";
