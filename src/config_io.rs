//! Runtime configuration I/O operations.
//!
//! Locates the user configuration file with the `dirs` crate and loads it
//! when present, falling back to defaults otherwise.

use crate::config::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the app config directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Get the path to the user config file for `app_name`.
///
/// Returns `None` when the platform has no config directory.
pub fn user_config_path(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(app_name).join(CONFIG_FILE_NAME))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one, the user config for the
/// default app name is loaded if present.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match explicit {
        Some(path) => Config::load_from_file(path)?,
        None => {
            let default_app = Config::default().app_name;
            match user_config_path(&default_app) {
                Some(path) => load_layer_from_path(&path)?.unwrap_or_default(),
                None => {
                    tracing::debug!("No config directory on this platform, using defaults");
                    Config::default()
                }
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load a config file if it exists
fn load_layer_from_path(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    tracing::debug!("Loading config from {}", path.display());
    Config::load_from_file(path).map(Some)
}
