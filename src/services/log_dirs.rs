//! Log directory management
//!
//! Logs are stored in `$XDG_STATE_HOME/native-fs/logs/` (typically
//! `~/.local/state/native-fs/logs/`). Platforms without a state directory
//! use the local data directory instead.
//!
//! Each process writes a PID-named log file so concurrent runs of the CLI
//! do not interleave. Old log files are removed on startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

/// Directory name shared by every log path
const APP_DIR: &str = "native-fs";

/// Minimum age for log files to be cleaned up (7 days)
const CLEANUP_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Cached log directory path
static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the base log directory, creating it if necessary.
///
/// As a last resort, falls back to the system temp directory.
pub fn log_dir() -> &'static PathBuf {
    LOG_DIR.get_or_init(|| {
        let fallback = std::env::temp_dir().join("native-fs-logs");
        let dir = state_log_dir().unwrap_or_else(|| fallback.clone());

        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create log directory {:?}: {}", dir, e);
            return fallback;
        }

        dir
    })
}

fn state_log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| base.join(APP_DIR).join("logs"))
}

/// Get the path for this process's log file.
///
/// Returns `{log_dir}/nfs-{PID}.log`
pub fn main_log_path() -> PathBuf {
    log_dir().join(format!("nfs-{}.log", std::process::id()))
}

/// Remove log files older than a week, except this process's own.
pub fn cleanup_stale_logs() {
    let removed = cleanup_stale_logs_in_dir(log_dir(), std::process::id(), CLEANUP_AGE);
    if removed > 0 {
        tracing::debug!("Cleaned up {} stale log files", removed);
    }
}

/// Clean up stale log files in a specific directory, returning how many were removed
fn cleanup_stale_logs_in_dir(dir: &Path, current_pid: u32, age: Duration) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        let Some(pid) = extract_pid_from_filename(&name) else {
            continue;
        };
        if pid == current_pid {
            continue;
        }

        if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
            && is_file_older_than(&entry.path(), age)
        {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::debug!("Failed to clean up stale log {:?}: {}", entry.path(), e)
                }
            }
        }
    }
    removed
}

/// Check if a file is older than the specified duration
fn is_file_older_than(path: &Path, age: Duration) -> bool {
    let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };

    SystemTime::now()
        .duration_since(modified)
        .map(|elapsed| elapsed > age)
        .unwrap_or(false)
}

/// Extract PID from a filename like "nfs-12345.log"
fn extract_pid_from_filename(name: &str) -> Option<u32> {
    let without_ext = name.strip_suffix(".log")?;
    let last_hyphen = without_ext.rfind('-')?;
    without_ext[last_hyphen + 1..].parse().ok()
}
