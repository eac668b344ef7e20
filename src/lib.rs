//! testing-fs - An asynchronous virtual filesystem double
//!
//! This library provides an in-memory filesystem that injects randomized
//! latency into every operation, for testing build tooling against
//! non-deterministic I/O timing, plus a disk-backed implementation of the
//! same `FileSystem` trait.

pub mod config;
pub mod fs;

pub use config::TestingFsOptions;
pub use fs::{DiskFs, FileStat, FileSystem, Fixture, FsError, FsErrorKind, FsNode, IoCounters, TestingFs};
