//! Application configuration loading
//!
//! Config precedence: env vars > config file > defaults. The application
//! secret is loaded from the FACEBOOK_SECRET env var or from
//! app_secret_file, never stored in the TOML directly to avoid leaking
//! secrets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use common::Secret;
use serde::Deserialize;

use crate::client::GraphConfig;
use crate::version::ApiVersion;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    #[serde(default)]
    pub client: ClientSettings,
}

/// Application identity
#[derive(Debug, Deserialize)]
pub struct AppSettings {
    pub app_id: String,
    #[serde(skip)]
    pub app_secret: Option<Secret<String>>,
    /// Path to a file containing the app secret (alternative to the
    /// FACEBOOK_SECRET env var)
    #[serde(default)]
    pub app_secret_file: Option<PathBuf>,
}

/// Graph client settings
#[derive(Debug, Deserialize)]
pub struct ClientSettings {
    /// Pinned API version; the client default applies when unset
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            version: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    ///
    /// App secret resolution order:
    /// 1. FACEBOOK_SECRET env var
    /// 2. app_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;

        if let Ok(app_id) = std::env::var("FACEBOOK_APP_ID") {
            config.app.app_id = app_id;
        }
        if config.app.app_id.is_empty() {
            return Err(common::Error::Config("app_id must not be empty".into()));
        }

        if config.client.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        // Validate the pinned version here so a bad config file fails at
        // startup instead of at the first client construction
        if let Some(version) = &config.client.version {
            ApiVersion::parse(version).map_err(|e| common::Error::Config(e.to_string()))?;
        }

        // Resolve the app secret: env var takes precedence over file
        if let Ok(secret) = std::env::var("FACEBOOK_SECRET") {
            config.app.app_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = config.app.app_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read app_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                config.app.app_secret = Some(Secret::new(secret));
            }
        }

        Ok(config)
    }

    /// Client settings for a `GraphClient` acting with the given token.
    pub fn graph_config(&self, access_token: Option<String>) -> GraphConfig {
        GraphConfig {
            access_token,
            app_secret: self.app.app_secret.as_ref().map(|s| s.expose().clone()),
            version: self.client.version.clone(),
            timeout: Some(Duration::from_secs(self.client.timeout_secs)),
            graph_url: None,
        }
    }
}
