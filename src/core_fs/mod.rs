// Filesystem access for sessions, confined to the server root

pub mod filesystem;

pub use filesystem::{normalize_path, FileSystem, LocalFileSystem};
