//! In-Memory Testing File System
//!
//! A latency-injected, in-memory double for the real filesystem. Content is
//! deterministic, completion timing is not: every asynchronous operation runs
//! as its own task after a random delay, so concurrent operations may finish
//! out of submission order.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::latency::Latency;
use super::path::{child_segment, normalize_path};
use super::types::*;
use crate::config::TestingFsOptions;

/// Shared handle to a node. Two keys holding the same handle are aliases.
pub(crate) type NodeRef = Arc<RwLock<FsNode>>;

/// Snapshot of the simulated I/O counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub reads: u64,
    pub writes: u64,
}

#[derive(Debug)]
struct Shared {
    data: Mutex<HashMap<String, NodeRef>>,
    disk_reads: AtomicU64,
    disk_writes: AtomicU64,
    latency: Latency,
}

impl Shared {
    fn count_read(&self) {
        self.disk_reads.fetch_add(1, Ordering::Relaxed);
    }

    fn count_writes(&self, n: u64) {
        self.disk_writes.fetch_add(n, Ordering::Relaxed);
    }

    fn read_file(&self, path: &str) -> Result<String, FsError> {
        let path = normalize_path(path);
        self.count_read();
        let data = self.data.lock();
        data.get(&path)
            .and_then(|node| node.read().content().map(str::to_string))
            .ok_or_else(|| FsError::not_found("read_file", &path))
    }

    fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let path = normalize_path(path);
        self.count_read();
        let data = self.data.lock();
        match data.get(&path) {
            Some(node) => Ok(FileStat::from(&*node.read())),
            None => Err(FsError::not_found("stat", &path)),
        }
    }
}

/// In-memory virtual file system with simulated latency.
///
/// Cloning yields another handle to the same instance: state and counters
/// are shared.
#[derive(Debug, Clone)]
pub struct TestingFs {
    shared: Arc<Shared>,
}

impl TestingFs {
    /// Create an empty filesystem with default latency.
    pub fn new() -> Self {
        Self::with_options(TestingFsOptions::default())
    }

    pub fn with_options(options: TestingFsOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                data: Mutex::new(HashMap::new()),
                disk_reads: AtomicU64::new(0),
                disk_writes: AtomicU64::new(0),
                latency: options.latency(),
            }),
        }
    }

    /// Number of simulated reads so far.
    pub fn disk_reads(&self) -> u64 {
        self.shared.disk_reads.load(Ordering::Relaxed)
    }

    /// Number of simulated writes so far.
    pub fn disk_writes(&self) -> u64 {
        self.shared.disk_writes.load(Ordering::Relaxed)
    }

    pub fn counters(&self) -> IoCounters {
        IoCounters {
            reads: self.disk_reads(),
            writes: self.disk_writes(),
        }
    }

    /// All stored keys, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.shared.data.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether `key` is stored verbatim.
    pub fn contains(&self, key: &str) -> bool {
        self.shared.data.lock().contains_key(key)
    }

    /// Copy of the node stored under `key`.
    pub fn node(&self, key: &str) -> Option<FsNode> {
        self.shared.data.lock().get(key).map(|node| node.read().clone())
    }

    /// Whether two keys share one node, as left behind by `copy_file`.
    pub fn is_aliased(&self, a: &str, b: &str) -> bool {
        let data = self.shared.data.lock();
        match (data.get(a), data.get(b)) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Replace a file's content through its shared node, so every key
    /// aliasing it sees the change. Counters are untouched.
    pub fn set_content_in_place(&self, key: &str, content: impl Into<String>) -> Result<(), FsError> {
        let data = self.shared.data.lock();
        let node = data.get(key).ok_or_else(|| FsError::not_found("set_content_in_place", key))?;
        let mut node = node.write();
        match &mut *node {
            FsNode::File { content: current } => {
                *current = content.into();
                Ok(())
            }
            FsNode::Directory => Err(FsError::not_found("set_content_in_place", key)),
        }
    }

    /// Store a node without latency or counting. Used for seeding.
    pub(crate) fn insert_node(&self, key: String, node: FsNode) {
        self.shared.data.lock().insert(key, Arc::new(RwLock::new(node)));
    }

    /// Visit every stored entry in key order.
    pub(crate) fn for_each_node(&self, mut f: impl FnMut(&str, &FsNode)) {
        let data = self.shared.data.lock();
        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort();
        for key in keys {
            f(key, &data[key].read());
        }
    }

    /// Run `body` on its own task once a random delay has elapsed.
    ///
    /// The task is detached: if the caller stops waiting, the delay still
    /// elapses and `body` still runs.
    fn schedule<T, F>(&self, operation: &'static str, path: &str, body: F) -> impl Future<Output = Result<T, FsError>>
    where
        T: Send + 'static,
        F: FnOnce(&Shared) -> Result<T, FsError> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let delay = shared.latency.resolve_time();
        let path = path.to_string();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = body(&shared);
            match &result {
                Ok(_) => trace!(operation, path = %path, ?delay, "fs op completed"),
                Err(err) => debug!(operation, path = %path, error = %err, "fs op failed"),
            }
            result
        });
        async move {
            task.await.map_err(|e| FsError::TaskFailed {
                operation: operation.to_string(),
                message: e.to_string(),
            })?
        }
    }
}

impl Default for TestingFs {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FileSystem trait implementation
// ============================================================================

#[async_trait]
impl FileSystem for TestingFs {
    /// `dest` ends up sharing `src`'s node. Neither path is normalized.
    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), FsError> {
        let (src, dest) = (src.to_string(), dest.to_string());
        self.schedule("copy_file", &src.clone(), move |shared| {
            shared.count_read();
            let mut data = shared.data.lock();
            let node = data
                .get(&src)
                .cloned()
                .ok_or_else(|| FsError::not_found("copy_file", &src))?;
            shared.count_writes(1);
            data.insert(dest, node);
            Ok(())
        })
        .await
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let path = path.to_string();
        self.schedule("mkdir", &path.clone(), move |shared| {
            let path = normalize_path(&path);
            shared.count_writes(1);
            let mut data = shared.data.lock();
            if data.contains_key(&path) {
                return Err(FsError::already_exists("mkdir", &path));
            }
            data.insert(path, Arc::new(RwLock::new(FsNode::Directory)));
            Ok(())
        })
        .await
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let path = path.to_string();
        self.schedule("readdir", &path.clone(), move |shared| {
            let dir = normalize_path(&path);
            shared.count_read();
            let data = shared.data.lock();
            if !data.contains_key(&dir) {
                return Err(FsError::not_found("readdir", &dir));
            }
            let names: BTreeSet<String> = data
                .keys()
                .filter_map(|key| child_segment(&dir, key).map(str::to_string))
                .collect();
            Ok(names.into_iter().collect())
        })
        .await
    }

    async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let path = path.to_string();
        self.schedule("read_file", &path.clone(), move |shared| shared.read_file(&path))
            .await
    }

    fn read_file_sync(&self, path: &str) -> Result<String, FsError> {
        self.shared.read_file(path)
    }

    async fn rmdir(&self, path: &str) -> Result<(), FsError> {
        let path = path.to_string();
        self.schedule("rmdir", &path.clone(), move |shared| {
            let dir = normalize_path(&path);
            let mut data = shared.data.lock();
            if !data.contains_key(&dir) {
                return Err(FsError::not_found("rmdir", &dir));
            }
            // For the root this is "//", so only the root key itself goes.
            let prefix = format!("{}/", dir);
            let before = data.len();
            data.retain(|key, _| key != &dir && !key.starts_with(&prefix));
            shared.count_writes((before - data.len()) as u64);
            Ok(())
        })
        .await
    }

    async fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let path = path.to_string();
        self.schedule("stat", &path.clone(), move |shared| shared.stat(&path))
            .await
    }

    fn stat_sync(&self, path: &str) -> Result<FileStat, FsError> {
        self.shared.stat(path)
    }

    async fn unlink(&self, path: &str) -> Result<(), FsError> {
        let path = path.to_string();
        self.schedule("unlink", &path.clone(), move |shared| {
            let path = normalize_path(&path);
            // Counted before the existence check, so failures count too.
            shared.count_writes(1);
            match shared.data.lock().remove(&path) {
                Some(_) => Ok(()),
                None => Err(FsError::not_found("unlink", &path)),
            }
        })
        .await
    }

    /// Stores under the verbatim `path`; callers pass normalized paths.
    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let (path, content) = (path.to_string(), content.to_string());
        self.schedule("write_file", &path.clone(), move |shared| {
            shared.count_writes(1);
            shared
                .data
                .lock()
                .insert(path, Arc::new(RwLock::new(FsNode::File { content })));
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
