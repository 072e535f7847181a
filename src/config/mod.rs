//! config
//!
//! Configuration loading and defaults.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. `--config <PATH>` (must exist)
//! 2. `$BIRDHOUSE_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/birdhouse/config.toml`
//! 4. `~/.birdhouse/config.toml` (canonical write location)
//!
//! No file at all means defaults.
//!
//! # Precedence
//!
//! 1. Default values
//! 2. Config file
//! 3. `BIRDHOUSE_CONSUMER_KEY` / `BIRDHOUSE_CONSUMER_SECRET`
//! 4. CLI prompts (not handled here)
//!
//! # Example
//!
//! ```no_run
//! use birdhouse::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("provider: {}", config.secrets_provider());
//! println!("timeout: {:?}", config.timeout());
//! ```

pub mod schema;

pub use schema::{ConsumerConfig, EndpointsConfig, FileConfig, HttpConfig, SecretsConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::api::{ApiEndpoints, DEFAULT_HOME_TIMELINE_URL, DEFAULT_UPDATE_STATUS_URL};
use crate::auth::{
    AuthConfig, DEFAULT_ACCESS_TOKEN_URL, DEFAULT_AUTHORIZE_URL, DEFAULT_RECORD_NAME,
    DEFAULT_REQUEST_TOKEN_URL, OUT_OF_BAND,
};
use crate::secrets::DEFAULT_PROVIDER;
use crate::transport::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "BIRDHOUSE_CONFIG";
/// Environment override for `consumer.key`.
pub const CONSUMER_KEY_ENV: &str = "BIRDHOUSE_CONSUMER_KEY";
/// Environment override for `consumer.secret`.
pub const CONSUMER_SECRET_ENV: &str = "BIRDHOUSE_CONSUMER_SECRET";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    /// Path the file was loaded from, if any.
    path: Option<PathBuf>,
}

impl Config {
    /// Load from the standard locations and the process environment.
    ///
    /// # Errors
    ///
    /// An explicit path that does not exist, or any file that exists but
    /// cannot be read, parsed or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(explicit, |name| std::env::var(name).ok())
    }

    /// Load with a caller-supplied environment lookup.
    pub fn load_with_env<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::locate(explicit, &env)? {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(&env);
        config.file.validate()?;
        Ok(config)
    }

    /// Read, parse and validate one file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    fn locate<F>(explicit: Option<&Path>, env: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Explicit path; missing is an error.
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        // 2. $BIRDHOUSE_CONFIG
        if let Some(path) = env(CONFIG_ENV).map(PathBuf::from) {
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 3. $XDG_CONFIG_HOME/birdhouse/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("birdhouse/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        // 4. ~/.birdhouse/config.toml
        if let Ok(path) = Self::canonical_path() {
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    fn apply_env<F>(&mut self, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = env(CONSUMER_KEY_ENV).filter(|v| !v.is_empty());
        let secret = env(CONSUMER_SECRET_ENV).filter(|v| !v.is_empty());
        if key.is_none() && secret.is_none() {
            return;
        }

        let consumer = self.file.consumer.get_or_insert_with(ConsumerConfig::default);
        if key.is_some() {
            consumer.key = key;
        }
        if secret.is_some() {
            consumer.secret = secret;
        }
    }

    /// Canonical config location, `~/.birdhouse/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".birdhouse/config.toml"))
    }

    /// Write the configuration back atomically.
    ///
    /// Goes to the file it was loaded from, or the canonical location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::canonical_path()?,
        };
        Self::write_config_atomic(&path, &self.file)?;
        Ok(path)
    }

    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Same directory, so the rename is atomic.
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessors with defaults
    // =========================================================================

    pub fn consumer_key(&self) -> Option<&str> {
        self.file.consumer.as_ref().and_then(|c| c.key.as_deref())
    }

    pub fn consumer_secret(&self) -> Option<&str> {
        self.file
            .consumer
            .as_ref()
            .and_then(|c| c.secret.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Supply the consumer secret at runtime (e.g. from a prompt).
    pub fn set_consumer_secret(&mut self, secret: impl Into<String>) {
        self.file
            .consumer
            .get_or_insert_with(ConsumerConfig::default)
            .secret = Some(secret.into());
    }

    /// The `oauth_callback` to send.
    ///
    /// Defaults to `oob`. An empty configured value means no callback.
    pub fn callback_url(&self) -> Option<&str> {
        match self
            .file
            .consumer
            .as_ref()
            .and_then(|c| c.callback_url.as_deref())
        {
            Some("") => None,
            Some(url) => Some(url),
            None => Some(OUT_OF_BAND),
        }
    }

    fn endpoint<'a>(
        &'a self,
        pick: impl Fn(&'a EndpointsConfig) -> &'a Option<String>,
        default: &'a str,
    ) -> &'a str {
        self.file
            .endpoints
            .as_ref()
            .and_then(|e| pick(e).as_deref())
            .unwrap_or(default)
    }

    pub fn request_token_url(&self) -> &str {
        self.endpoint(|e| &e.request_token, DEFAULT_REQUEST_TOKEN_URL)
    }

    pub fn authorize_url(&self) -> &str {
        self.endpoint(|e| &e.authorize, DEFAULT_AUTHORIZE_URL)
    }

    pub fn access_token_url(&self) -> &str {
        self.endpoint(|e| &e.access_token, DEFAULT_ACCESS_TOKEN_URL)
    }

    pub fn home_timeline_url(&self) -> &str {
        self.endpoint(|e| &e.home_timeline, DEFAULT_HOME_TIMELINE_URL)
    }

    pub fn update_status_url(&self) -> &str {
        self.endpoint(|e| &e.update_status, DEFAULT_UPDATE_STATUS_URL)
    }

    /// Defaults to "file".
    pub fn secrets_provider(&self) -> &str {
        self.file
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or(DEFAULT_PROVIDER)
    }

    /// Directory for the file provider; `None` means `~/.birdhouse`.
    pub fn secrets_directory(&self) -> Option<&Path> {
        self.file
            .secrets
            .as_ref()
            .and_then(|s| s.directory.as_deref())
    }

    /// Defaults to `twitter.config`.
    pub fn record_name(&self) -> &str {
        self.file
            .secrets
            .as_ref()
            .and_then(|s| s.record_name.as_deref())
            .unwrap_or(DEFAULT_RECORD_NAME)
    }

    /// Defaults to 30 seconds.
    pub fn timeout(&self) -> Duration {
        self.file
            .http
            .as_ref()
            .and_then(|h| h.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn user_agent(&self) -> &str {
        self.file
            .http
            .as_ref()
            .and_then(|h| h.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Handshake settings for the authorizer.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            request_token_url: self.request_token_url().to_string(),
            authorize_url: self.authorize_url().to_string(),
            access_token_url: self.access_token_url().to_string(),
            callback_url: self.callback_url().map(str::to_string),
        }
    }

    /// API endpoints for the facade.
    pub fn api_endpoints(&self) -> ApiEndpoints {
        ApiEndpoints {
            home_timeline: self.home_timeline_url().to_string(),
            update_status: self.update_status_url().to_string(),
        }
    }

    /// Path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
