//! Dispatcher configuration.
//!
//! Transport settings shared by every dispatch made through one
//! [`crate::executor::Dispatcher`]. The per-request timeout is not here: it comes
//! from each request description.

use crate::config::{get_config, AppConfig};
use serde::{Deserialize, Serialize};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Whether 3xx responses are followed.
    pub follow_redirects: bool,

    /// Redirect hop limit when following.
    pub max_redirects: u32,

    /// Whether to validate TLS certificates.
    pub validate_ssl: bool,

    /// User-Agent applied when a request does not set one.
    pub user_agent: String,
}

impl DispatchConfig {
    /// Creates a DispatchConfig from an application configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The application configuration to read from
    ///
    /// # Returns
    ///
    /// A new `DispatchConfig` with the transport settings of `config`.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            follow_redirects: config.follow_redirects,
            max_redirects: config.max_redirects,
            validate_ssl: config.validate_ssl,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Creates a DispatchConfig from the global configuration.
    pub fn from_global_config() -> Self {
        Self::from_app_config(&get_config())
    }

    /// Redirect policy for the HTTP client.
    pub fn redirect_policy(&self) -> reqwest::redirect::Policy {
        if self.follow_redirects {
            reqwest::redirect::Policy::limited(self.max_redirects as usize)
        } else {
            reqwest::redirect::Policy::none()
        }
    }
}

impl Default for DispatchConfig {
    /// Creates a default DispatchConfig using global configuration.
    fn default() -> Self {
        Self::from_global_config()
    }
}
