//! File System Types
//!
//! Core types and the capability trait shared by every filesystem backend.

use async_trait::async_trait;
use std::io;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EIO: {message}, {operation} '{path}'")]
    Io { path: String, operation: String, message: String },

    #[error("{operation} task failed: {message}")]
    TaskFailed { operation: String, message: String },

    #[error("invalid fixture: {message}")]
    Fixture { message: String },
}

/// Coarse classification of an [`FsError`], for matching in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    NotFound,
    AlreadyExists,
    Io,
    TaskFailed,
    Fixture,
}

impl FsError {
    pub(crate) fn not_found(operation: &str, path: &str) -> Self {
        FsError::NotFound {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn already_exists(operation: &str, path: &str) -> Self {
        FsError::AlreadyExists {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn kind(&self) -> FsErrorKind {
        match self {
            FsError::NotFound { .. } => FsErrorKind::NotFound,
            FsError::AlreadyExists { .. } => FsErrorKind::AlreadyExists,
            FsError::Io { .. } => FsErrorKind::Io,
            FsError::TaskFailed { .. } => FsErrorKind::TaskFailed,
            FsError::Fixture { .. } => FsErrorKind::Fixture,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FsErrorKind::NotFound
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match err.kind() {
            FsErrorKind::NotFound => io::ErrorKind::NotFound,
            FsErrorKind::AlreadyExists => io::ErrorKind::AlreadyExists,
            FsErrorKind::Fixture => io::ErrorKind::InvalidData,
            FsErrorKind::Io | FsErrorKind::TaskFailed => io::ErrorKind::Other,
        };
        io::Error::new(kind, err.to_string())
    }
}

/// A stored filesystem entry. Only files carry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsNode {
    File { content: String },
    Directory,
}

impl FsNode {
    pub fn file(content: impl Into<String>) -> Self {
        FsNode::File { content: content.into() }
    }

    /// Check if entry is a file
    pub fn is_file(&self) -> bool {
        matches!(self, FsNode::File { .. })
    }

    /// Check if entry is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self, FsNode::Directory)
    }

    /// File content, or `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match self {
            FsNode::File { content } => Some(content),
            FsNode::Directory => None,
        }
    }
}

/// Result of a `stat` call.
///
/// The flags are captured when the call completes; later changes to the
/// entry are not reflected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    is_file: bool,
    is_directory: bool,
}

impl FileStat {
    pub fn new(is_file: bool, is_directory: bool) -> Self {
        Self { is_file, is_directory }
    }

    pub fn is_file(&self) -> bool {
        self.is_file
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

impl From<&FsNode> for FileStat {
    fn from(node: &FsNode) -> Self {
        Self::new(node.is_file(), node.is_directory())
    }
}

impl From<&std::fs::Metadata> for FileStat {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self::new(meta.is_file(), meta.is_dir())
    }
}

/// Filesystem capability consumed by build tooling.
///
/// Implemented by the in-memory [`TestingFs`](super::TestingFs) double and by
/// [`DiskFs`](super::DiskFs), so callers can be driven by either.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Copy `src` to `dest`.
    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), FsError>;

    /// Create a single directory. Fails if anything already exists there.
    async fn mkdir(&self, path: &str) -> Result<(), FsError>;

    /// Sorted names of the immediate children of a directory.
    async fn readdir(&self, path: &str) -> Result<Vec<String>, FsError>;

    /// Read the contents of a file as a string
    async fn read_file(&self, path: &str) -> Result<String, FsError>;

    /// Blocking variant of [`read_file`](FileSystem::read_file).
    fn read_file_sync(&self, path: &str) -> Result<String, FsError>;

    /// Remove a directory and everything below it.
    async fn rmdir(&self, path: &str) -> Result<(), FsError>;

    /// Get file/directory information
    async fn stat(&self, path: &str) -> Result<FileStat, FsError>;

    /// Blocking variant of [`stat`](FileSystem::stat).
    fn stat_sync(&self, path: &str) -> Result<FileStat, FsError>;

    /// Remove a single entry.
    async fn unlink(&self, path: &str) -> Result<(), FsError>;

    /// Write content to a file, creating it if it doesn't exist
    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_node_methods() {
        let file = FsNode::file("abc");
        assert!(file.is_file());
        assert!(!file.is_directory());
        assert_eq!(file.content(), Some("abc"));

        let dir = FsNode::Directory;
        assert!(!dir.is_file());
        assert!(dir.is_directory());
        assert_eq!(dir.content(), None);
    }

    #[test]
    fn test_stat_from_node() {
        let stat = FileStat::from(&FsNode::Directory);
        assert!(stat.is_directory());
        assert!(!stat.is_file());

        let stat = FileStat::from(&FsNode::file(""));
        assert!(stat.is_file());
        assert!(!stat.is_directory());
    }

    #[test]
    fn test_error_messages_name_operation_and_path() {
        let err = FsError::not_found("readdir", "/app");
        assert_eq!(err.to_string(), "ENOENT: no such file or directory, readdir '/app'");
        assert!(err.is_not_found());

        let err = FsError::already_exists("mkdir", "/app");
        assert_eq!(err.to_string(), "EEXIST: file already exists, mkdir '/app'");
        assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
    }

    #[test]
    fn test_into_io_error() {
        let err: io::Error = FsError::not_found("stat", "/x").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = FsError::already_exists("mkdir", "/x").into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
