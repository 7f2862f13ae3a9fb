use native_fs_core::StorageVolume;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory name used under the platform cache/data roots
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Default tracing filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub roots: RootOverrides,

    #[serde(default)]
    pub signals: SignalPolicy,

    /// External storage roots reported by `external_storage_paths`.
    /// When empty the provider detects them.
    #[serde(default)]
    pub storage_volumes: Vec<StorageVolume>,

    /// Where persisted document grants are recorded.
    /// Defaults to `<MainBundleDir>/uri_permissions.json`.
    #[serde(default)]
    pub grants_file: Option<PathBuf>,
}

fn default_app_name() -> String {
    "native-fs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-root replacements for the system-resolved directories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootOverrides {
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub database_dir: Option<PathBuf>,
    #[serde(default)]
    pub document_dir: Option<PathBuf>,
    #[serde(default)]
    pub main_bundle_dir: Option<PathBuf>,
    #[serde(default)]
    pub sd_card_dir: Option<PathBuf>,
}

/// Decides which failures of `move`, `rename` and `delete` come back as
/// `Ok(false)` instead of an error.
///
/// Anything not covered here is always raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPolicy {
    /// A missing source yields `false` rather than NotFound
    #[serde(default = "default_true")]
    pub missing_source_as_false: bool,

    /// A rename onto an existing sibling yields `false` rather than a State error
    #[serde(default = "default_true")]
    pub rename_collision_as_false: bool,
}

impl Default for SignalPolicy {
    fn default() -> Self {
        Self {
            missing_source_as_false: true,
            rename_collision_as_false: true,
        }
    }
}

impl SignalPolicy {
    /// Raise every failure, never answer `false`
    pub fn strict() -> Self {
        Self {
            missing_source_as_false: false,
            rename_collision_as_false: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            log_level: default_log_level(),
            roots: RootOverrides::default(),
            signals: SignalPolicy::default(),
            storage_volumes: Vec::new(),
            grants_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "app_name cannot be empty".to_string(),
            ));
        }
        if self.app_name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(
                "app_name must be a single path component".to_string(),
            ));
        }

        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }

        for volume in &self.storage_volumes {
            if volume.path.is_empty() {
                return Err(ConfigError::ValidationError(
                    "storage volume path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "native-fs");
        assert_eq!(config.log_level, "info");
        assert!(config.signals.missing_source_as_false);
        assert!(config.signals.rename_collision_as_false);
        assert!(config.storage_volumes.is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.app_name = "a/b".to_string();
        assert!(config.validate().is_err());

        config.app_name = "ok".to_string();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.signals = SignalPolicy::strict();
        config.storage_volumes.push(StorageVolume {
            path: "/mnt/usb".to_string(),
            removable: true,
        });
        config.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.signals, SignalPolicy::strict());
        assert_eq!(loaded.storage_volumes, config.storage_volumes);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"signals":{"missing_source_as_false":false}}"#).unwrap();
        assert_eq!(config.app_name, "native-fs");
        assert!(!config.signals.missing_source_as_false);
        assert!(config.signals.rename_collision_as_false);
    }
}
