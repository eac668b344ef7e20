//! Disk File System
//!
//! The real-filesystem implementation of [`FileSystem`]. Code written against
//! the trait runs unchanged on this backend and on the in-memory double.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::path::normalize_path;
use super::types::*;

/// Filesystem backed by a directory on disk.
///
/// Every path is resolved under `root`; `..` cannot climb out of it.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let normalized = normalize_path(path);
        self.root.join(normalized.trim_start_matches('/'))
    }
}

fn map_io_error(operation: &str, path: &str, err: io::Error) -> FsError {
    match err.kind() {
        io::ErrorKind::NotFound => FsError::not_found(operation, path),
        io::ErrorKind::AlreadyExists => FsError::already_exists(operation, path),
        _ => FsError::Io {
            path: path.to_string(),
            operation: operation.to_string(),
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl FileSystem for DiskFs {
    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), FsError> {
        fs::copy(self.resolve(src), self.resolve(dest))
            .await
            .map(|_| ())
            .map_err(|e| map_io_error("copy_file", src, e))
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        fs::create_dir(self.resolve(path))
            .await
            .map_err(|e| map_io_error("mkdir", path, e))
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let mut dir = fs::read_dir(self.resolve(path))
            .await
            .map_err(|e| map_io_error("readdir", path, e))?;
        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| map_io_error("readdir", path, e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, path: &str) -> Result<String, FsError> {
        fs::read_to_string(self.resolve(path))
            .await
            .map_err(|e| map_io_error("read_file", path, e))
    }

    fn read_file_sync(&self, path: &str) -> Result<String, FsError> {
        std::fs::read_to_string(self.resolve(path)).map_err(|e| map_io_error("read_file", path, e))
    }

    async fn rmdir(&self, path: &str) -> Result<(), FsError> {
        fs::remove_dir_all(self.resolve(path))
            .await
            .map_err(|e| map_io_error("rmdir", path, e))
    }

    async fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let meta = fs::metadata(self.resolve(path))
            .await
            .map_err(|e| map_io_error("stat", path, e))?;
        Ok(FileStat::from(&meta))
    }

    fn stat_sync(&self, path: &str) -> Result<FileStat, FsError> {
        let meta = std::fs::metadata(self.resolve(path)).map_err(|e| map_io_error("stat", path, e))?;
        Ok(FileStat::from(&meta))
    }

    async fn unlink(&self, path: &str) -> Result<(), FsError> {
        fs::remove_file(self.resolve(path))
            .await
            .map_err(|e| map_io_error("unlink", path, e))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        fs::write(self.resolve(path), content)
            .await
            .map_err(|e| map_io_error("write_file", path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn setup() -> (DiskFs, TempDir) {
        let dir = TempDir::new("testing-fs").unwrap();
        (DiskFs::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (fs, _dir) = setup();
        fs.write_file("/a.txt", "hello").await.unwrap();
        assert_eq!(fs.read_file("/a.txt").await.unwrap(), "hello");
        assert_eq!(fs.read_file_sync("a.txt").unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_mkdir_readdir_rmdir() {
        let (fs, _dir) = setup();
        fs.mkdir("/app").await.unwrap();
        assert_eq!(fs.mkdir("/app").await.unwrap_err().kind(), FsErrorKind::AlreadyExists);
        fs.mkdir("/app/src").await.unwrap();
        fs.write_file("/app/b.ts", "").await.unwrap();
        fs.write_file("/app/a.ts", "").await.unwrap();
        assert_eq!(fs.readdir("/app").await.unwrap(), vec!["a.ts", "b.ts", "src"]);

        fs.rmdir("/app").await.unwrap();
        assert!(fs.readdir("/app").await.unwrap_err().is_not_found());
        assert!(fs.rmdir("/app").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_stat_copy_unlink() {
        let (fs, _dir) = setup();
        fs.write_file("/src.txt", "data").await.unwrap();
        fs.copy_file("/src.txt", "/dest.txt").await.unwrap();
        assert!(fs.stat("/dest.txt").await.unwrap().is_file());
        assert!(fs.stat_sync("/").unwrap().is_directory());

        fs.unlink("/dest.txt").await.unwrap();
        assert!(fs.stat("/dest.txt").await.unwrap_err().is_not_found());
        assert!(fs.unlink("/dest.txt").await.unwrap_err().is_not_found());
        assert!(fs.copy_file("/nope", "/x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_paths_stay_under_root() {
        let (fs, dir) = setup();
        assert_eq!(fs.resolve("../../etc/passwd"), dir.path().join("etc/passwd"));
    }
}
