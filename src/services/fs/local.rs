//! Local filesystem provider
//!
//! Implements the provider contract on top of `tokio::fs`. Compression and
//! hashing stream through blocking readers, so they run on the blocking pool.

use super::codec;
use super::provider::FsProvider;
use crate::config::{Config, SignalPolicy};
use crate::roots;
use async_trait::async_trait;
use native_fs_core::{
    DirectoryRootSet, Encoding, FileDescriptor, FsError, HashAlgorithm, Result, StorageVolume,
};
use std::fs::Metadata;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const FILE_URI_PREFIX: &str = "file://";

/// Provider backed by the host's local filesystem
#[derive(Debug, Clone)]
pub struct LocalFsProvider {
    roots: DirectoryRootSet,
    signals: SignalPolicy,
    /// Configured volumes; detected on each call when empty
    storage_volumes: Vec<StorageVolume>,
}

impl LocalFsProvider {
    pub fn new(roots: DirectoryRootSet) -> Self {
        Self {
            roots,
            signals: SignalPolicy::default(),
            storage_volumes: Vec::new(),
        }
    }

    /// Build a provider from configuration.
    ///
    /// Uses the process-wide roots when installed, otherwise resolves them
    /// from the system directories.
    pub fn from_config(config: &Config) -> io::Result<Self> {
        let roots = match roots::get() {
            Some(installed) => installed.clone(),
            None => roots::resolve(config)?,
        };
        Ok(Self::new(roots)
            .with_signals(config.signals)
            .with_storage_volumes(config.storage_volumes.clone()))
    }

    pub fn with_signals(mut self, signals: SignalPolicy) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_storage_volumes(mut self, volumes: Vec<StorageVolume>) -> Self {
        self.storage_volumes = volumes;
        self
    }

    /// Answer a missing source per the signal policy
    fn missing_source(&self, err: FsError) -> Result<bool> {
        if self.signals.missing_source_as_false {
            tracing::debug!("{err}, reporting false");
            Ok(false)
        } else {
            Err(err)
        }
    }
}

/// Accept plain paths and `file://` URIs
pub fn parse_path(path: &str) -> PathBuf {
    PathBuf::from(path.strip_prefix(FILE_URI_PREFIX).unwrap_or(path))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build the descriptor snapshot for `path`
fn describe(path: &Path, metadata: &Metadata) -> FileDescriptor {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_string(path));

    let descriptor = if metadata.is_dir() {
        FileDescriptor::directory(path_string(path), name)
    } else {
        FileDescriptor::file(path_string(path), name, metadata.len())
    };

    descriptor
        .with_last_modified(modified_millis(metadata))
        .with_can_read(can_read(metadata))
}

fn modified_millis(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn can_read(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o444 != 0
}

#[cfg(not(unix))]
fn can_read(_metadata: &Metadata) -> bool {
    true
}

/// Create the missing parent directories of `path`
async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| FsError::from_io(e, parent.to_string_lossy()))?;
    }
    Ok(())
}

/// Run blocking work on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FsError::Io(io::Error::other(format!("blocking task failed: {e}"))))?
}

/// Whether a rename failed only because source and target sit on different filesystems
fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18; // EXDEV
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17; // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    err.raw_os_error() == Some(CROSS_DEVICE)
}

#[async_trait]
impl FsProvider for LocalFsProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn constants(&self) -> &DirectoryRootSet {
        &self.roots
    }

    async fn copy(&self, source: &str, target: &str) -> Result<()> {
        let source_path = parse_path(source);
        let target_path = parse_path(target);

        let metadata = fs::metadata(&source_path)
            .await
            .map_err(|e| FsError::from_io(e, source))?;
        if metadata.is_dir() {
            return Err(FsError::State(format!("{source}: is a directory")));
        }

        ensure_parent(&target_path).await?;
        fs::copy(&source_path, &target_path)
            .await
            .map_err(|e| FsError::from_io(e, target))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        fs::try_exists(parse_path(path))
            .await
            .map_err(|e| FsError::from_io(e, path))
    }

    async fn list(&self, path: &str) -> Result<Vec<FileDescriptor>> {
        let dir = parse_path(path);
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| FsError::from_io(e, path))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(e, path))?
        {
            let entry_path = entry.path();
            match fs::metadata(&entry_path).await {
                Ok(metadata) => files.push(describe(&entry_path, &metadata)),
                // Dangling symlinks and entries removed mid-listing
                Err(e) => tracing::warn!("Skipping {}: {}", entry_path.display(), e),
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn make_directory(&self, path: &str) -> Result<FileDescriptor> {
        let dir = parse_path(path);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| FsError::from_io(e, path))?;

        let metadata = fs::metadata(&dir)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        Ok(describe(&dir, &metadata))
    }

    async fn move_path(&self, source: &str, target: &str) -> Result<bool> {
        let source_path = parse_path(source);
        let target_path = parse_path(target);

        let metadata = match fs::symlink_metadata(&source_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return self.missing_source(FsError::from_io(e, source));
            }
            Err(e) => return Err(FsError::from_io(e, source)),
        };

        ensure_parent(&target_path).await?;
        match fs::rename(&source_path, &target_path).await {
            Ok(()) => Ok(true),
            Err(e) if metadata.is_file() && is_cross_device(&e) => {
                tracing::debug!("rename {source} -> {target} crosses devices, copying instead");
                fs::copy(&source_path, &target_path)
                    .await
                    .map_err(|e| FsError::from_io(e, target))?;
                if let Err(e) = fs::remove_file(&source_path).await {
                    // Leave only the source behind
                    if let Err(cleanup) = fs::remove_file(&target_path).await {
                        tracing::warn!("Failed to remove copied target {target}: {cleanup}");
                    }
                    return Err(FsError::from_io(e, source));
                }
                Ok(true)
            }
            Err(e) => Err(FsError::from_io(e, source)),
        }
    }

    async fn rename(&self, source: &str, new_name: &str) -> Result<bool> {
        let source_path = parse_path(source);

        match fs::symlink_metadata(&source_path).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return self.missing_source(FsError::from_io(e, source));
            }
            Err(e) => return Err(FsError::from_io(e, source)),
        }

        let target_path = match source_path.parent() {
            Some(parent) => parent.join(new_name),
            None => PathBuf::from(new_name),
        };

        let taken = fs::try_exists(&target_path)
            .await
            .map_err(|e| FsError::from_io(e, target_path.to_string_lossy()))?;
        if taken {
            if self.signals.rename_collision_as_false {
                tracing::debug!("rename {source}: {new_name} already exists, reporting false");
                return Ok(false);
            }
            return Err(FsError::State(format!(
                "{}: already exists",
                target_path.display()
            )));
        }

        fs::rename(&source_path, &target_path)
            .await
            .map_err(|e| FsError::from_io(e, source))?;
        Ok(true)
    }

    async fn read_file(&self, path: &str, encoding: Encoding) -> Result<String> {
        let bytes = fs::read(parse_path(path))
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        codec::encode_output(bytes, encoding)
    }

    async fn stat(&self, path: &str) -> Result<FileDescriptor> {
        let file = parse_path(path);
        let metadata = fs::metadata(&file)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        Ok(describe(&file, &metadata))
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let target = parse_path(path);

        let metadata = match fs::symlink_metadata(&target).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return self.missing_source(FsError::from_io(e, path));
            }
            Err(e) => return Err(FsError::from_io(e, path)),
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&target).await
        } else {
            fs::remove_file(&target).await
        };
        removed.map_err(|e| FsError::from_io(e, path))?;
        Ok(true)
    }

    async fn write_file(&self, path: &str, content: &str, encoding: Encoding) -> Result<()> {
        let bytes = codec::decode_input(content, encoding)?;
        let file = parse_path(path);

        ensure_parent(&file).await?;
        fs::write(&file, bytes)
            .await
            .map_err(|e| FsError::from_io(e, path))
    }

    async fn append_file(&self, path: &str, content: &str, encoding: Encoding) -> Result<()> {
        let bytes = codec::decode_input(content, encoding)?;
        let file_path = parse_path(path);

        ensure_parent(&file_path).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .map_err(|e| FsError::from_io(e, path))?;

        file.write_all(&bytes)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        file.flush().await.map_err(|e| FsError::from_io(e, path))
    }

    async fn compress_file(&self, source: &str, target: &str) -> Result<()> {
        let source_path = parse_path(source);
        let target_path = parse_path(target);
        ensure_parent(&target_path).await?;

        let (source, target) = (source.to_string(), target.to_string());
        run_blocking(move || {
            let input =
                std::fs::File::open(&source_path).map_err(|e| FsError::from_io(e, &source))?;
            let output =
                std::fs::File::create(&target_path).map_err(|e| FsError::from_io(e, &target))?;
            codec::gzip_stream(BufReader::new(input), BufWriter::new(output))
                .map_err(|e| FsError::from_io(e, &target))?;
            Ok(())
        })
        .await
    }

    async fn decompress_file(&self, source: &str, target: &str) -> Result<()> {
        let source_path = parse_path(source);
        let target_path = parse_path(target);
        ensure_parent(&target_path).await?;

        let (source, target) = (source.to_string(), target.to_string());
        run_blocking(move || {
            let input =
                std::fs::File::open(&source_path).map_err(|e| FsError::from_io(e, &source))?;
            let output =
                std::fs::File::create(&target_path).map_err(|e| FsError::from_io(e, &target))?;
            codec::gunzip_stream(BufReader::new(input), BufWriter::new(output)).map_err(|e| {
                if codec::is_corrupt_stream(&e) {
                    FsError::Codec(format!("{source}: {e}"))
                } else {
                    FsError::from_io(e, &target)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn compress_string(&self, content: &str, encoding: Encoding) -> Result<String> {
        let bytes = codec::decode_input(content, encoding)?;
        run_blocking(move || {
            let packed = codec::gzip_bytes(&bytes)?;
            Ok(codec::encode_base64(&packed))
        })
        .await
    }

    async fn decompress_string(&self, content: &str, encoding: Encoding) -> Result<String> {
        let packed = codec::decode_base64(content)?;
        run_blocking(move || {
            let bytes = codec::gunzip_bytes(&packed)?;
            codec::encode_output(bytes, encoding)
        })
        .await
    }

    async fn hash(&self, path: &str, algorithm: HashAlgorithm) -> Result<String> {
        let file_path = parse_path(path);
        let path = path.to_string();

        run_blocking(move || {
            let file = std::fs::File::open(&file_path).map_err(|e| FsError::from_io(e, &path))?;
            if file
                .metadata()
                .map_err(|e| FsError::from_io(e, &path))?
                .is_dir()
            {
                return Err(FsError::State(format!("{path}: is a directory")));
            }
            codec::digest_reader(BufReader::new(file), algorithm)
                .map_err(|e| FsError::from_io(e, &path))
        })
        .await
    }

    async fn external_storage_paths(&self, removable: Option<bool>) -> Result<Vec<String>> {
        let volumes = if self.storage_volumes.is_empty() {
            detect_storage_volumes(&self.roots).await
        } else {
            self.storage_volumes.clone()
        };

        Ok(volumes
            .into_iter()
            .filter(|volume| removable.map_or(true, |wanted| volume.removable == wanted))
            .map(|volume| volume.path)
            .collect())
    }
}

/// Find storage roots on this host
///
/// The primary root is the SD card root when one is configured, otherwise the
/// home directory. On Linux, mounts under the user's media directories are
/// reported as removable.
async fn detect_storage_volumes(roots: &DirectoryRootSet) -> Vec<StorageVolume> {
    let mut volumes = Vec::new();

    let primary = roots
        .sd_card_dir
        .clone()
        .or_else(|| dirs::home_dir().map(|home| path_string(&home)));
    if let Some(path) = primary {
        volumes.push(StorageVolume {
            path,
            removable: false,
        });
    }

    #[cfg(target_os = "linux")]
    if let Ok(user) = std::env::var("USER") {
        for base in ["/media", "/run/media"] {
            let Ok(mut entries) = fs::read_dir(Path::new(base).join(&user)).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                    volumes.push(StorageVolume {
                        path: path_string(&entry.path()),
                        removable: true,
                    });
                }
            }
        }
    }

    volumes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider(temp_dir: &TempDir) -> LocalFsProvider {
        LocalFsProvider::new(roots::for_testing(temp_dir.path()))
    }

    fn path_in(temp_dir: &TempDir, name: &str) -> String {
        path_string(&temp_dir.path().join(name))
    }

    #[test]
    fn test_parse_path_strips_file_uri() {
        assert_eq!(parse_path("file:///tmp/a"), PathBuf::from("/tmp/a"));
        assert_eq!(parse_path("/tmp/b"), PathBuf::from("/tmp/b"));
    }

    #[test]
    fn test_from_config_uses_installed_roots() {
        let installed = roots::init(roots::for_testing(Path::new("/installed")));
        let local = LocalFsProvider::from_config(&Config::default()).unwrap();
        assert_eq!(local.constants(), installed);
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_stat_describes() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        let file = path_in(&temp_dir, "a/b/note.txt");

        local.write_file(&file, "hello", Encoding::Utf8).await.unwrap();
        let stat = local.stat(&file).await.unwrap();

        assert_eq!(stat.name, "note.txt");
        assert!(stat.is_file);
        assert_eq!(stat.size, 5);
        assert_eq!(stat.mime_type.as_deref(), Some("text/plain"));
        assert!(stat.last_modified > 0);
        assert!(stat.can_read);
    }

    #[tokio::test]
    async fn test_append_creates_then_extends() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        let file = path_in(&temp_dir, "logs/app.log");

        local.append_file(&file, "one", Encoding::Utf8).await.unwrap();
        local.append_file(&file, "dHdv", Encoding::Base64).await.unwrap();

        assert_eq!(
            local.read_file(&file, Encoding::Utf8).await.unwrap(),
            "onetwo"
        );
    }

    #[tokio::test]
    async fn test_append_to_directory_is_state_error() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        let dir = path_in(&temp_dir, "");

        let err = local.append_file(&dir, "x", Encoding::Utf8).await.unwrap_err();
        assert!(matches!(err, FsError::State(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_rejects_files() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(temp_dir.path().join("c")).unwrap();

        let listing = local.list(&path_in(&temp_dir, "")).await.unwrap();
        let names: Vec<_> = listing.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c"]);
        assert!(listing[2].is_directory);
        assert_eq!(listing[2].mime_type, None);

        let err = local.list(&path_in(&temp_dir, "a.txt")).await.unwrap_err();
        assert!(matches!(err, FsError::State(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_make_directory_over_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("taken"), "x").unwrap();

        let err = local
            .make_directory(&path_in(&temp_dir, "taken"))
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::State(_)), "got {err:?}");

        let again = local.make_directory(&path_in(&temp_dir, "d/e")).await.unwrap();
        assert!(again.is_directory);
        let twice = local.make_directory(&path_in(&temp_dir, "d/e")).await.unwrap();
        assert_eq!(twice.name, "e");
    }

    #[tokio::test]
    async fn test_delete_is_recursive_and_signals_missing() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::create_dir_all(temp_dir.path().join("tree/leaf")).unwrap();
        std::fs::write(temp_dir.path().join("tree/leaf/f"), "x").unwrap();

        let tree = path_in(&temp_dir, "tree");
        assert!(local.delete(&tree).await.unwrap());
        assert!(!local.exists(&tree).await.unwrap());
        assert!(!local.delete(&tree).await.unwrap());

        let strict = provider(&temp_dir).with_signals(SignalPolicy::strict());
        assert!(strict.delete(&tree).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_rename_collision_follows_policy() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("x"), "1").unwrap();
        std::fs::write(temp_dir.path().join("y"), "2").unwrap();

        assert!(!local.rename(&path_in(&temp_dir, "x"), "y").await.unwrap());

        let strict = provider(&temp_dir).with_signals(SignalPolicy::strict());
        let err = strict.rename(&path_in(&temp_dir, "x"), "y").await.unwrap_err();
        assert!(matches!(err, FsError::State(_)));

        assert!(local.rename(&path_in(&temp_dir, "x"), "z").await.unwrap());
        assert_eq!(std::fs::read_to_string(temp_dir.path().join("z")).unwrap(), "1");
    }

    #[tokio::test]
    async fn test_move_creates_target_parent() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("src.txt"), "moved").unwrap();

        let target = path_in(&temp_dir, "deep/dst.txt");
        assert!(local
            .move_path(&path_in(&temp_dir, "src.txt"), &target)
            .await
            .unwrap());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "moved");
        assert!(!local
            .move_path(&path_in(&temp_dir, "src.txt"), &target)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_move_onto_directory_fails_without_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("src.txt"), "stays").unwrap();
        std::fs::create_dir(temp_dir.path().join("occupied")).unwrap();
        std::fs::write(temp_dir.path().join("occupied/keep.txt"), "keep").unwrap();

        let result = local
            .move_path(
                &path_in(&temp_dir, "src.txt"),
                &path_in(&temp_dir, "occupied"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("src.txt")).unwrap(),
            "stays"
        );
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("occupied"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("keep.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_only_cross_device_errors_allow_copy_fallback() {
        assert!(is_cross_device(&io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(13)));
        assert!(!is_cross_device(&io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied"
        )));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_string_compression_yields_to_other_tasks() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        // Large enough that the gzip work outlasts the first poll
        let content: String = (0..4_000_000u32)
            .map(|i| char::from(b'a' + (i.wrapping_mul(2_654_435_761) >> 27) as u8 % 26))
            .collect();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });
        let packed = local.compress_string(&content, Encoding::Utf8).await.unwrap();
        assert!(ran.load(Ordering::SeqCst), "compression blocked the runtime");

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });
        let unpacked = local.decompress_string(&packed, Encoding::Utf8).await.unwrap();
        assert!(ran.load(Ordering::SeqCst), "decompression blocked the runtime");
        assert_eq!(unpacked, content);
    }

    #[tokio::test]
    async fn test_copy_missing_source_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);

        let err = local
            .copy(&path_in(&temp_dir, "nope"), &path_in(&temp_dir, "dst"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_compress_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        let original = "line\n".repeat(1000);
        std::fs::write(temp_dir.path().join("plain.txt"), &original).unwrap();

        let packed = path_in(&temp_dir, "out/plain.txt.gz");
        let unpacked = path_in(&temp_dir, "back/plain.txt");
        local
            .compress_file(&path_in(&temp_dir, "plain.txt"), &packed)
            .await
            .unwrap();
        local.decompress_file(&packed, &unpacked).await.unwrap();

        assert!(std::fs::metadata(&packed).unwrap().len() < original.len() as u64);
        assert_eq!(std::fs::read_to_string(&unpacked).unwrap(), original);
    }

    #[tokio::test]
    async fn test_decompress_corrupt_file_is_codec_error() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("bad.gz"), "not gzip at all").unwrap();

        let err = local
            .decompress_file(&path_in(&temp_dir, "bad.gz"), &path_in(&temp_dir, "out"))
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::Codec(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_hash_file() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir);
        std::fs::write(temp_dir.path().join("abc"), "abc").unwrap();

        let digest = local
            .hash(&path_in(&temp_dir, "abc"), HashAlgorithm::Md5)
            .await
            .unwrap();
        assert_eq!(digest, "900150983cd24fb0d6963f7d28e17f72");

        let err = local
            .hash(&path_in(&temp_dir, "missing"), HashAlgorithm::Sha1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_configured_storage_volumes_are_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let local = provider(&temp_dir).with_storage_volumes(vec![
            StorageVolume {
                path: "/storage/emulated/0".into(),
                removable: false,
            },
            StorageVolume {
                path: "/storage/ABCD-1234".into(),
                removable: true,
            },
        ]);

        assert_eq!(local.external_storage_paths(None).await.unwrap().len(), 2);
        assert_eq!(
            local.external_storage_paths(Some(true)).await.unwrap(),
            vec!["/storage/ABCD-1234"]
        );
        assert_eq!(
            local.external_storage_paths(Some(false)).await.unwrap(),
            vec!["/storage/emulated/0"]
        );
    }
}
