//! File System Module
//!
//! Filesystem capability trait and its implementations:
//! - TestingFs: in-memory double with randomized per-operation latency
//! - DiskFs: the real filesystem under a root directory

pub mod types;
pub mod path;
pub mod latency;
pub mod testing_fs;
pub mod fixture;
pub mod disk_fs;

pub use types::*;
pub use path::{child_segment, normalize_path};
pub use latency::Latency;
pub use testing_fs::{IoCounters, TestingFs};
pub use fixture::Fixture;
pub use disk_fs::DiskFs;
