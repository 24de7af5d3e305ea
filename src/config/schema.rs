//! Configuration schema for apicraft.
//!
//! This module defines the configuration structure and validation logic for all
//! user-configurable settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
///
/// All settings are read from a JSON document under the "apicraft" key.
/// Missing settings fall back to sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Default request timeout in milliseconds.
    ///
    /// Applied to new request descriptions. Defaults to 30000ms (30 seconds).
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum number of entries kept in the main request history.
    ///
    /// Defaults to 100. Must be > 0.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Maximum number of entries kept in the "recent requests" list.
    ///
    /// Defaults to 50. Must be > 0.
    #[serde(default = "default_recent_history_limit")]
    pub recent_history_limit: usize,

    /// Whether to automatically follow HTTP redirects.
    ///
    /// When enabled, 3xx responses are followed up to `max_redirects` times and
    /// the final response is reported. Defaults to true.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow. Defaults to 10.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether to validate SSL/TLS certificates.
    ///
    /// **Warning:** Disabling SSL validation can expose you to security risks.
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    /// User-Agent sent when a request does not set one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory for the file store. Defaults to `~/.config/apicraft`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            history_limit: default_history_limit(),
            recent_history_limit: default_recent_history_limit(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            validate_ssl: default_validate_ssl(),
            user_agent: default_user_agent(),
            storage_dir: None,
        }
    }
}

impl AppConfig {
    /// Validates the configuration and returns errors if any settings are invalid.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.history_limit == 0 {
            return Err("historyLimit must be greater than 0".to_string());
        }

        if self.recent_history_limit == 0 {
            return Err("recentHistoryLimit must be greater than 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("userAgent must not be empty".to_string());
        }

        // max_redirects can be 0 (no redirects), so no validation needed

        Ok(())
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }

    /// Directory the file store should use.
    ///
    /// The configured `storageDir` if set, otherwise `~/.config/apicraft`
    /// (`%USERPROFILE%\AppData\Roaming\apicraft` on Windows). Falls back to a
    /// relative `.apicraft` directory when no home directory is known.
    pub fn storage_path(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return dir.clone();
        }

        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config").join("apicraft")
        } else if let Some(user_profile) = std::env::var_os("USERPROFILE") {
            PathBuf::from(user_profile)
                .join("AppData")
                .join("Roaming")
                .join("apicraft")
        } else {
            PathBuf::from(".apicraft")
        }
    }

    /// Merges this configuration with another, using values from `other` where present.
    ///
    /// # Arguments
    ///
    /// * `other` - Configuration to merge with (takes precedence)
    ///
    /// # Returns
    ///
    /// A new `AppConfig` with merged values.
    pub fn merge(&self, other: &AppConfig) -> Self {
        Self {
            timeout: other.timeout,
            history_limit: other.history_limit,
            recent_history_limit: other.recent_history_limit,
            follow_redirects: other.follow_redirects,
            max_redirects: other.max_redirects,
            validate_ssl: other.validate_ssl,
            user_agent: other.user_agent.clone(),
            storage_dir: other.storage_dir.clone().or_else(|| self.storage_dir.clone()),
        }
    }
}

// Default value functions for serde

fn default_timeout() -> u64 {
    30000 // 30 seconds in milliseconds
}

fn default_history_limit() -> usize {
    100
}

fn default_recent_history_limit() -> usize {
    50
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_validate_ssl() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("apicraft/{}", env!("CARGO_PKG_VERSION"))
}
