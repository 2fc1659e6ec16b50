use log::{debug, warn};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;

/// Capability surface the session uses to touch the disk.
///
/// All paths are absolute. Implementations refuse anything outside the
/// root they were built with.
pub trait FileSystem: Send + Sync {
    fn root(&self) -> &Path;
    fn exists(&self, path: &Path) -> bool;
    fn is_directory(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn list_names(&self, path: &Path) -> io::Result<Vec<String>>;
    fn create_directory(&self, path: &Path) -> io::Result<()>;
    fn delete_directory(&self, path: &Path) -> io::Result<()>;
    fn open_for_read(&self, path: &Path) -> io::Result<File>;
    /// Creates a new file; fails if something already exists at `path`.
    fn open_for_write(&self, path: &Path) -> io::Result<File>;
}

/// Resolves `.` and `..` components without touching the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// The root is canonicalized when it exists, so symlink checks compare
    /// like with like.
    pub fn new(root: PathBuf) -> Self {
        let root = fs::canonicalize(&root).unwrap_or(root);
        Self { root }
    }

    fn scoped(&self, path: &Path) -> io::Result<PathBuf> {
        let normalized = normalize_path(path);
        if normalized.starts_with(&self.root) && self.resolves_inside(&normalized) {
            Ok(normalized)
        } else {
            warn!("Path is outside of the allowed area: {:?}", path);
            Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "path is outside of the allowed area",
            ))
        }
    }

    /// Follows symlinks on the deepest part of `path` that exists and checks
    /// the real location is still below the root.
    fn resolves_inside(&self, path: &Path) -> bool {
        let existing = path
            .ancestors()
            .find(|ancestor| fs::symlink_metadata(ancestor).is_ok());
        match existing.map(fs::canonicalize) {
            Some(Ok(real)) => real.starts_with(&self.root),
            _ => false,
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> bool {
        self.scoped(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.scoped(path).map(|p| p.is_dir()).unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.scoped(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn list_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let path = self.scoped(path)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        debug!("Listed {} entries in {:?}", names.len(), path);
        Ok(names)
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(self.scoped(path)?)
    }

    fn delete_directory(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(self.scoped(path)?)
    }

    fn open_for_read(&self, path: &Path) -> io::Result<File> {
        let file = fs::File::open(self.scoped(path)?)?;
        Ok(File::from_std(file))
    }

    fn open_for_write(&self, path: &Path) -> io::Result<File> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.scoped(path)?)?;
        Ok(File::from_std(file))
    }
}
