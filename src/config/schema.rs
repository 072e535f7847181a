//! config::schema
//!
//! Configuration file schema.
//!
//! Every section and every field is optional; accessors on
//! [`Config`](super::Config) supply defaults. Unknown fields are rejected so
//! typos surface instead of being silently ignored.
//!
//! # Validation
//!
//! Values are validated after parsing: endpoint URLs must be absolute
//! http(s) URLs, the secrets provider must be known, the timeout must be
//! positive, and the record name must be a plain file name.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;
use crate::secrets::PROVIDERS;

/// The whole configuration file.
///
/// # Example
///
/// ```toml
/// [consumer]
/// key = "xvz1evFS4wEEPTGEFPHBog"
/// callback_url = "oob"
///
/// [secrets]
/// provider = "file"
///
/// [http]
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub consumer: Option<ConsumerConfig>,
    pub endpoints: Option<EndpointsConfig>,
    pub secrets: Option<SecretsConfig>,
    pub http: Option<HttpConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(consumer) = &self.consumer {
            consumer.validate()?;
        }
        if let Some(endpoints) = &self.endpoints {
            endpoints.validate()?;
        }
        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }
        if let Some(http) = &self.http {
            http.validate()?;
        }
        Ok(())
    }
}

/// Application credentials issued by the provider.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumerConfig {
    pub key: Option<String>,
    pub secret: Option<String>,
    /// `oauth_callback` value. An empty string sends no callback.
    pub callback_url: Option<String>,
}

impl ConsumerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.key {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "consumer.key cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ConsumerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerConfig")
            .field("key", &self.key)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// Provider endpoint overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointsConfig {
    pub request_token: Option<String>,
    pub authorize: Option<String>,
    pub access_token: Option<String>,
    pub home_timeline: Option<String>,
    pub update_status: Option<String>,
}

impl EndpointsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("endpoints.request_token", &self.request_token),
            ("endpoints.authorize", &self.authorize),
            ("endpoints.access_token", &self.access_token),
            ("endpoints.home_timeline", &self.home_timeline),
            ("endpoints.update_status", &self.update_status),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                validate_http_url(name, value)?;
            }
        }
        Ok(())
    }
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidValue(format!("{} is not a valid URL '{}': {}", name, value, e))
    })?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} must be an http(s) URL, got '{}'",
            name, value
        ))),
    }
}

/// Secret storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use ("file", "keychain" or "memory")
    pub provider: Option<String>,
    /// Directory for the file provider
    pub directory: Option<PathBuf>,
    /// Name of the access-token record
    pub record_name: Option<String>,
}

impl SecretsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    PROVIDERS.join(", ")
                )));
            }
        }
        if let Some(name) = &self.record_name {
            if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue(format!(
                    "secrets.record_name must be a plain file name, got '{}'",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl HttpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(agent) = &self.user_agent {
            if agent.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "http.user_agent cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
