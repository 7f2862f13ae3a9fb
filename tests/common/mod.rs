#![allow(dead_code)]

pub mod tracing;

use native_fs::roots;
use native_fs::services::fs::{FsProvider, LocalFsProvider, SlowFsConfig, SlowFsProvider};
use native_fs::FileSystem;
use std::sync::Arc;
use tempfile::TempDir;

/// A facade over the local provider, rooted in `temp_dir`
pub fn local_fs(temp_dir: &TempDir) -> FileSystem {
    tracing::init_tracing_from_env();
    FileSystem::new(local_provider(temp_dir))
}

pub fn local_provider(temp_dir: &TempDir) -> Arc<dyn FsProvider> {
    Arc::new(LocalFsProvider::new(roots::for_testing(temp_dir.path())))
}

/// A facade over a counting slow provider, returning both
pub fn slow_fs(temp_dir: &TempDir, config: SlowFsConfig) -> (FileSystem, Arc<SlowFsProvider>) {
    tracing::init_tracing_from_env();
    let slow = Arc::new(SlowFsProvider::new(local_provider(temp_dir), config));
    (FileSystem::new(slow.clone()), slow)
}

/// Absolute path of `name` inside `temp_dir`, as the facade expects it
pub fn path_in(temp_dir: &TempDir, name: &str) -> String {
    temp_dir.path().join(name).to_string_lossy().into_owned()
}
