//! Configuration management.
//!
//! This module provides configuration loading, validation, and access through a singleton pattern.
//! Configuration is read from a JSON document under the "apicraft" key and merged with defaults.

pub mod schema;

pub use schema::AppConfig;

use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::RwLock;

/// Key under which settings are read.
pub const SETTINGS_KEY: &str = "apicraft";

/// Global configuration instance.
///
/// This is lazily initialized on first access and can be updated when settings change.
static CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| RwLock::new(AppConfig::default()));

/// Errors that can occur when loading configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The settings file could not be read.
    Io(String),

    /// The settings file is not valid JSON.
    Parse(String),

    /// The merged configuration failed validation.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read settings: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse settings: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads configuration from a JSON value.
///
/// This function reads the "apicraft" settings, merges them with defaults,
/// validates the result, and updates the global configuration.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value containing user settings under "apicraft" key
///
/// # Returns
///
/// `Ok(AppConfig)` with the loaded configuration, or `Err` if validation fails. On
/// error the global configuration is left unchanged.
///
/// # Example
///
/// ```
/// use apicraft::config::{load_config, reset_config};
/// use serde_json::json;
///
/// let settings = json!({
///     "apicraft": {
///         "timeout": 60000,
///         "validateSsl": false
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 60000);
/// reset_config();
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();

    if let Some(settings) = settings_json {
        if let Some(app_settings) = settings.get(SETTINGS_KEY) {
            match serde_json::from_value::<AppConfig>(app_settings.clone()) {
                Ok(user_config) => {
                    // User settings take precedence
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse {} settings: {}. Using defaults.",
                        SETTINGS_KEY,
                        e
                    );
                }
            }
        }
    }

    config.validate().map_err(ConfigError::Invalid)?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// A missing file is not an error: defaults are loaded instead.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        log::debug!("No settings file at {}, using defaults", path.display());
        return load_config(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    let settings: Value =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    load_config(Some(settings))
}

/// Gets the current global configuration.
///
/// Returns a clone of the current configuration, or the defaults if nothing has
/// been loaded yet.
pub fn get_config() -> AppConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| AppConfig::default())
}

/// Updates the configuration in place.
///
/// If the result fails validation, the configuration reverts to defaults.
///
/// # Example
///
/// ```
/// use apicraft::config::{get_config, reset_config, update_config};
///
/// update_config(|config| {
///     config.timeout = 60000;
/// });
/// assert_eq!(get_config().timeout, 60000);
/// reset_config();
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut AppConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            *config = AppConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = AppConfig::default();
    }
}
