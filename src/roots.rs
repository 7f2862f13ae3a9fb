//! Process-wide storage roots
//!
//! The root set is resolved from the platform directories once at startup
//! and read without synchronization afterwards.

use crate::config::Config;
use native_fs_core::DirectoryRootSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable Android uses for the primary external storage mount
const EXTERNAL_STORAGE_ENV: &str = "EXTERNAL_STORAGE";

static ROOTS: OnceLock<DirectoryRootSet> = OnceLock::new();

/// Resolve roots from the system directories for `app_name`
pub fn from_system(app_name: &str) -> io::Result<DirectoryRootSet> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine cache directory",
            )
        })?
        .join(app_name);

    let bundle_dir = dirs::data_dir()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?
        .join(app_name);

    Ok(DirectoryRootSet {
        cache_dir: path_string(&cache_dir),
        database_dir: database_dir(&bundle_dir).map(|p| path_string(&p)),
        document_dir: path_string(&bundle_dir.join("files")),
        main_bundle_dir: path_string(&bundle_dir),
        sd_card_dir: std::env::var(EXTERNAL_STORAGE_ENV)
            .ok()
            .filter(|dir| !dir.is_empty()),
    })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn database_dir(bundle_dir: &Path) -> Option<PathBuf> {
    Some(bundle_dir.join("databases"))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn database_dir(_bundle_dir: &Path) -> Option<PathBuf> {
    None
}

/// Resolve roots for a configuration, applying its overrides
pub fn resolve(config: &Config) -> io::Result<DirectoryRootSet> {
    let mut roots = from_system(&config.app_name)?;
    let overrides = &config.roots;

    if let Some(dir) = &overrides.cache_dir {
        roots.cache_dir = path_string(dir);
    }
    if let Some(dir) = &overrides.database_dir {
        roots.database_dir = Some(path_string(dir));
    }
    if let Some(dir) = &overrides.document_dir {
        roots.document_dir = path_string(dir);
    }
    if let Some(dir) = &overrides.main_bundle_dir {
        roots.main_bundle_dir = path_string(dir);
    }
    if let Some(dir) = &overrides.sd_card_dir {
        roots.sd_card_dir = Some(path_string(dir));
    }

    Ok(roots)
}

/// Install the process-wide root set.
///
/// The first call wins; later calls return the already-installed value.
pub fn init(roots: DirectoryRootSet) -> &'static DirectoryRootSet {
    ROOTS.get_or_init(|| roots)
}

/// The process-wide root set, if `init` has run
pub fn get() -> Option<&'static DirectoryRootSet> {
    ROOTS.get()
}

/// Roots pointing into a temp directory, for tests
pub fn for_testing(temp_dir: &Path) -> DirectoryRootSet {
    DirectoryRootSet {
        cache_dir: path_string(&temp_dir.join("cache")),
        database_dir: Some(path_string(&temp_dir.join("databases"))),
        document_dir: path_string(&temp_dir.join("files")),
        main_bundle_dir: path_string(temp_dir),
        sd_card_dir: None,
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
