//! Fixtures
//!
//! Declarative initial state for a [`TestingFs`], loadable from TOML or
//! JSON, and JSON snapshots of a live instance for assertions.
//!
//! ```toml
//! dirs = ["/app", "/app/src"]
//!
//! [files]
//! "/app/src/index.ts" = "export {};"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::path::normalize_path;
use super::testing_fs::TestingFs;
use super::types::{FsError, FsNode};
use crate::config::TestingFsOptions;

/// Directories and files to seed, or captured from, a [`TestingFs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub dirs: Vec<String>,
    pub files: BTreeMap<String, String>,
}

impl Fixture {
    pub fn from_toml(input: &str) -> Result<Self, FsError> {
        toml::from_str(input).map_err(|e| FsError::Fixture { message: e.to_string() })
    }

    pub fn from_json(input: &str) -> Result<Self, FsError> {
        serde_json::from_str(input).map_err(|e| FsError::Fixture { message: e.to_string() })
    }

    pub fn to_json(&self) -> Result<String, FsError> {
        serde_json::to_string_pretty(self).map_err(|e| FsError::Fixture { message: e.to_string() })
    }

    pub fn dir(mut self, path: impl Into<String>) -> Self {
        self.dirs.push(path.into());
        self
    }

    pub fn file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl TestingFs {
    /// Create a filesystem pre-populated from `fixture`.
    ///
    /// Paths are normalized. Seeding performs no simulated I/O: counters
    /// start at zero.
    pub fn with_fixture(options: TestingFsOptions, fixture: &Fixture) -> Self {
        let fs = Self::with_options(options);
        for dir in &fixture.dirs {
            fs.insert_node(normalize_path(dir), FsNode::Directory);
        }
        for (path, content) in &fixture.files {
            fs.insert_node(normalize_path(path), FsNode::file(content.as_str()));
        }
        fs
    }

    /// Current contents as a [`Fixture`], keyed by the stored paths.
    pub fn snapshot(&self) -> Fixture {
        let mut fixture = Fixture::default();
        self.for_each_node(|key, node| match node {
            FsNode::Directory => fixture.dirs.push(key.to_string()),
            FsNode::File { content } => {
                fixture.files.insert(key.to_string(), content.clone());
            }
        });
        fixture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSystem;

    const TOML_FIXTURE: &str = r#"
dirs = ["/app", "app/src/"]

[files]
"/app/src/index.ts" = "export {};"
"/app/package.json" = "{}"
"#;

    #[test]
    fn test_from_toml() {
        let fixture = Fixture::from_toml(TOML_FIXTURE).unwrap();
        assert_eq!(fixture.dirs, vec!["/app", "app/src/"]);
        assert_eq!(fixture.files.len(), 2);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = Fixture::from_json(r#"{"folders": []}"#).unwrap_err();
        assert!(matches!(err, FsError::Fixture { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_fs() {
        let fixture = Fixture::from_toml(TOML_FIXTURE).unwrap();
        let fs = TestingFs::with_fixture(TestingFsOptions::default(), &fixture);
        assert_eq!(fs.disk_reads(), 0);
        assert_eq!(fs.disk_writes(), 0);

        assert_eq!(fs.readdir("/app").await.unwrap(), vec!["package.json", "src"]);
        assert!(fs.stat("/app/src").await.unwrap().is_directory());
        assert_eq!(fs.read_file("/app/src/index.ts").await.unwrap(), "export {};");
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reflects_operations() {
        let fixture = Fixture::default().dir("/out").file("/out/a.js", "a");
        let fs = TestingFs::with_fixture(TestingFsOptions::default(), &fixture);
        fs.write_file("/out/b.js", "b").await.unwrap();
        fs.unlink("/out/a.js").await.unwrap();

        let snapshot = fs.snapshot();
        assert_eq!(snapshot, Fixture::default().dir("/out").file("/out/b.js", "b"));

        let json = snapshot.to_json().unwrap();
        assert_eq!(Fixture::from_json(&json).unwrap(), snapshot);
    }
}
