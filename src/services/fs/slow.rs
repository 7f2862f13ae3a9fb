//! Slow filesystem provider for testing
//!
//! Wraps any FsProvider and adds configurable delays to simulate slow
//! storage (network mounts, SD cards, content providers). It also counts
//! calls per operation, which lets tests check that the facade forwards
//! each call exactly once.

use super::provider::FsProvider;
use async_trait::async_trait;
use native_fs_core::{DirectoryRootSet, Encoding, FileDescriptor, HashAlgorithm, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Configuration for slow storage simulation
#[derive(Debug, Clone)]
pub struct SlowFsConfig {
    /// Delay for exists and stat
    pub metadata_delay: Duration,
    /// Delay for listing a directory
    pub list_delay: Duration,
    /// Delay for reads and hashing
    pub read_delay: Duration,
    /// Delay for writes, appends, copies, moves, renames, deletes and mkdir
    pub write_delay: Duration,
    /// Delay for compression in either direction
    pub compress_delay: Duration,
}

impl SlowFsConfig {
    /// Create a config with uniform delay for all operations
    pub fn uniform(delay: Duration) -> Self {
        Self {
            metadata_delay: delay,
            list_delay: delay,
            read_delay: delay,
            write_delay: delay,
            compress_delay: delay,
        }
    }

    /// Create a config with no delays (useful as a baseline)
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// Create a config simulating a network mount
    pub fn slow_network() -> Self {
        Self {
            metadata_delay: Duration::from_millis(30),
            list_delay: Duration::from_millis(500),
            read_delay: Duration::from_millis(100),
            write_delay: Duration::from_millis(150),
            compress_delay: Duration::from_millis(200),
        }
    }

    /// Create a config simulating a slow removable card
    pub fn slow_disk() -> Self {
        Self {
            metadata_delay: Duration::from_millis(10),
            list_delay: Duration::from_millis(200),
            read_delay: Duration::from_millis(50),
            write_delay: Duration::from_millis(80),
            compress_delay: Duration::from_millis(100),
        }
    }
}

impl Default for SlowFsConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Call counts for provider operations
#[derive(Debug, Clone, Default)]
pub struct ProviderMetrics {
    calls: BTreeMap<&'static str, usize>,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
}

impl ProviderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of calls made to `operation`
    pub fn calls(&self, operation: &str) -> usize {
        self.calls.get(operation).copied().unwrap_or(0)
    }

    /// Get total number of provider calls
    pub fn total_calls(&self) -> usize {
        self.calls.values().sum()
    }

    fn record(&mut self, operation: &'static str) {
        *self.calls.entry(operation).or_default() += 1;
    }
}

/// Slow provider wrapper for testing
pub struct SlowFsProvider {
    inner: Arc<dyn FsProvider>,
    config: SlowFsConfig,
    metrics: Arc<Mutex<ProviderMetrics>>,
}

impl SlowFsProvider {
    pub fn new(inner: Arc<dyn FsProvider>, config: SlowFsConfig) -> Self {
        Self {
            inner,
            config,
            metrics: Arc::new(Mutex::new(ProviderMetrics::new())),
        }
    }

    /// Get a snapshot of current metrics
    pub async fn metrics(&self) -> ProviderMetrics {
        self.metrics.lock().await.clone()
    }

    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    /// Add delay and count the call
    async fn enter(&self, operation: &'static str, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut metrics = self.metrics.lock().await;
        metrics.total_delay_time += delay;
        metrics.record(operation);
    }
}

#[async_trait]
impl FsProvider for SlowFsProvider {
    fn name(&self) -> &str {
        "slow"
    }

    fn constants(&self) -> &DirectoryRootSet {
        self.inner.constants()
    }

    async fn copy(&self, source: &str, target: &str) -> Result<()> {
        self.enter("copy", self.config.write_delay).await;
        self.inner.copy(source, target).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.enter("exists", self.config.metadata_delay).await;
        self.inner.exists(path).await
    }

    async fn list(&self, path: &str) -> Result<Vec<FileDescriptor>> {
        self.enter("list", self.config.list_delay).await;
        self.inner.list(path).await
    }

    async fn make_directory(&self, path: &str) -> Result<FileDescriptor> {
        self.enter("make_directory", self.config.write_delay).await;
        self.inner.make_directory(path).await
    }

    async fn move_path(&self, source: &str, target: &str) -> Result<bool> {
        self.enter("move_path", self.config.write_delay).await;
        self.inner.move_path(source, target).await
    }

    async fn rename(&self, source: &str, new_name: &str) -> Result<bool> {
        self.enter("rename", self.config.write_delay).await;
        self.inner.rename(source, new_name).await
    }

    async fn read_file(&self, path: &str, encoding: Encoding) -> Result<String> {
        self.enter("read_file", self.config.read_delay).await;
        self.inner.read_file(path, encoding).await
    }

    async fn stat(&self, path: &str) -> Result<FileDescriptor> {
        self.enter("stat", self.config.metadata_delay).await;
        self.inner.stat(path).await
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        self.enter("delete", self.config.write_delay).await;
        self.inner.delete(path).await
    }

    async fn write_file(&self, path: &str, content: &str, encoding: Encoding) -> Result<()> {
        self.enter("write_file", self.config.write_delay).await;
        self.inner.write_file(path, content, encoding).await
    }

    async fn append_file(&self, path: &str, content: &str, encoding: Encoding) -> Result<()> {
        self.enter("append_file", self.config.write_delay).await;
        self.inner.append_file(path, content, encoding).await
    }

    async fn compress_file(&self, source: &str, target: &str) -> Result<()> {
        self.enter("compress_file", self.config.compress_delay).await;
        self.inner.compress_file(source, target).await
    }

    async fn decompress_file(&self, source: &str, target: &str) -> Result<()> {
        self.enter("decompress_file", self.config.compress_delay).await;
        self.inner.decompress_file(source, target).await
    }

    async fn compress_string(&self, content: &str, encoding: Encoding) -> Result<String> {
        self.enter("compress_string", self.config.compress_delay).await;
        self.inner.compress_string(content, encoding).await
    }

    async fn decompress_string(&self, content: &str, encoding: Encoding) -> Result<String> {
        self.enter("decompress_string", self.config.compress_delay).await;
        self.inner.decompress_string(content, encoding).await
    }

    async fn hash(&self, path: &str, algorithm: HashAlgorithm) -> Result<String> {
        self.enter("hash", self.config.read_delay).await;
        self.inner.hash(path, algorithm).await
    }

    async fn external_storage_paths(&self, removable: Option<bool>) -> Result<Vec<String>> {
        self.enter("external_storage_paths", self.config.metadata_delay).await;
        self.inner.external_storage_paths(removable).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots;
    use crate::services::fs::LocalFsProvider;
    use std::time::Instant;
    use tempfile::TempDir;

    fn local(temp_dir: &TempDir) -> Arc<dyn FsProvider> {
        Arc::new(LocalFsProvider::new(roots::for_testing(temp_dir.path())))
    }

    #[tokio::test]
    async fn test_slow_provider_adds_delay() {
        let temp_dir = TempDir::new().unwrap();
        let slow = SlowFsProvider::new(
            local(&temp_dir),
            SlowFsConfig::uniform(Duration::from_millis(100)),
        );

        let start = Instant::now();
        let _ = slow.list(&temp_dir.path().to_string_lossy()).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100),
            "Expected at least 100ms delay, got {:?}",
            elapsed
        );

        let metrics = slow.metrics().await;
        assert_eq!(metrics.calls("list"), 1);
        assert!(metrics.total_delay_time >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_metrics_tracking() {
        let temp_dir = TempDir::new().unwrap();
        let slow = SlowFsProvider::new(local(&temp_dir), SlowFsConfig::none());
        let path = temp_dir.path().join("f.txt").to_string_lossy().into_owned();

        slow.write_file(&path, "x", Encoding::Utf8).await.unwrap();
        let _ = slow.exists(&path).await;
        let _ = slow.stat(&path).await;
        let _ = slow.stat(&path).await;

        let metrics = slow.metrics().await;
        assert_eq!(metrics.calls("write_file"), 1);
        assert_eq!(metrics.calls("exists"), 1);
        assert_eq!(metrics.calls("stat"), 2);
        assert_eq!(metrics.calls("delete"), 0);
        assert_eq!(metrics.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_failures_are_counted_and_passed_through() {
        let temp_dir = TempDir::new().unwrap();
        let slow = SlowFsProvider::new(local(&temp_dir), SlowFsConfig::none());
        let missing = temp_dir.path().join("missing").to_string_lossy().into_owned();

        let err = slow.stat(&missing).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(slow.metrics().await.calls("stat"), 1);
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let temp_dir = TempDir::new().unwrap();
        let slow = SlowFsProvider::new(local(&temp_dir), SlowFsConfig::none());

        let _ = slow.list(&temp_dir.path().to_string_lossy()).await;
        let _ = slow.compress_string("abc", Encoding::Utf8).await;
        assert!(slow.metrics().await.total_calls() > 0);

        slow.reset_metrics().await;
        assert_eq!(slow.metrics().await.total_calls(), 0);
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(
            SlowFsConfig::slow_network().list_delay,
            Duration::from_millis(500)
        );
        assert_eq!(
            SlowFsConfig::slow_disk().list_delay,
            Duration::from_millis(200)
        );
        assert_eq!(SlowFsConfig::none().write_delay, Duration::ZERO);
    }
}
