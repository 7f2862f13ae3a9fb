//! Tracing subscriber setup
//!
//! Shared by the `nfs` binary and tests. Output goes to a log file when one
//! is given and to stderr otherwise; stdout stays free for command results.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Fails if the log file
/// cannot be created or a global subscriber is already installed.
pub fn init_global(log_file_path: Option<&Path>, default_level: &str) -> std::io::Result<()> {
    let writer = match log_file_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            BoxMakeWriter::new(Arc::new(File::create(path)?))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    build_subscriber(writer, default_level)
        .try_init()
        .map_err(std::io::Error::other)
}

/// Build a subscriber writing to `writer`.
///
/// This is the core subscriber configuration shared between the binary and tests.
pub fn build_subscriber(
    writer: BoxMakeWriter,
    default_level: &str,
) -> impl tracing::Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn file_subscriber(
        log_file: &NamedTempFile,
        level: &str,
    ) -> impl tracing::Subscriber + Send + Sync {
        let file = log_file.reopen().unwrap();
        build_subscriber(BoxMakeWriter::new(Arc::new(file)), level)
    }

    #[test]
    fn test_default_level_filters_debug() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let log_file = NamedTempFile::new().unwrap();

        tracing::subscriber::with_default(file_subscriber(&log_file, "info"), || {
            tracing::info!("kept message");
            tracing::debug!("dropped message");
        });

        let contents = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("kept message"));
        assert!(!contents.contains("dropped message"));
        assert!(contents.contains("INFO"));
    }

    #[test]
    fn test_output_has_no_ansi_escapes() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let log_file = NamedTempFile::new().unwrap();

        tracing::subscriber::with_default(file_subscriber(&log_file, "warn"), || {
            tracing::warn!(path = "/tmp/x", "provider warning");
        });

        let contents = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("provider warning"));
        assert!(contents.contains("path=\"/tmp/x\""));
        assert!(!contents.contains('\u{1b}'));
    }
}
