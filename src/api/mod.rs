//! api
//!
//! The facade the host application talks to.
//!
//! # Design
//!
//! [`BirdHouse`] wraps an [`Authorizer`] and exposes the public operations:
//! `authorize`, `deauthorize`, `is_authorized`, `call`, `get_timeline` and
//! `post_status`. Every API operation authorizes first when no access token
//! is held, then issues exactly one signed request rendered with the
//! `Authorization` header.
//!
//! # Known limitation
//!
//! A token revoked mid-session surfaces as [`ApiError::Http`] with status
//! 401. The session stays `Authorized` and is not re-authorized
//! automatically; `deauthorize` followed by `authorize` replaces the token.
//!
//! # Example
//!
//! ```ignore
//! use birdhouse::api::{BirdHouse, TimelineQuery};
//!
//! let mut birdhouse = BirdHouse::from_config(&config, consent)?;
//! for status in birdhouse.get_timeline(&TimelineQuery::default()).await? {
//!     println!("{} {}", status.author(), status.text);
//! }
//! ```

mod errors;
pub mod types;

pub use errors::ApiError;
pub use types::{ApiResponse, Status, StatusUser, TimelineQuery, MAX_STATUS_CHARS};

use std::sync::Arc;

use crate::auth::{
    AuthError, AuthStatus, AuthorizationState, Authorizer, ConsentProvider, CredentialStore,
    DeauthStatus,
};
use crate::config::{Config, ConfigError};
use crate::oauth::{ConsumerCredentials, RequestBuilder};
use crate::secrets;
use crate::transport::http::ReqwestTransport;
use crate::transport::HttpMethod;

pub const DEFAULT_HOME_TIMELINE_URL: &str =
    "https://api.twitter.com/1.1/statuses/home_timeline.json";
pub const DEFAULT_UPDATE_STATUS_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

/// API endpoints used by the typed operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub home_timeline: String,
    pub update_status: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            home_timeline: DEFAULT_HOME_TIMELINE_URL.to_string(),
            update_status: DEFAULT_UPDATE_STATUS_URL.to_string(),
        }
    }
}

/// Authorized access to the timeline API.
#[derive(Debug)]
pub struct BirdHouse {
    authorizer: Authorizer,
    endpoints: ApiEndpoints,
}

impl BirdHouse {
    pub fn new(authorizer: Authorizer, endpoints: ApiEndpoints) -> Self {
        Self {
            authorizer,
            endpoints,
        }
    }

    /// Wire the production transport and secret store from configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` when the consumer key or secret is
    /// missing, the secret store cannot be created, or the HTTP client
    /// cannot be built.
    pub fn from_config(
        config: &Config,
        consent: Arc<dyn ConsentProvider>,
    ) -> Result<Self, ConfigError> {
        let key = config.consumer_key().ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "consumer.key is not set (config file or {})",
                crate::config::CONSUMER_KEY_ENV
            ))
        })?;
        let secret = config.consumer_secret().ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "consumer.secret is not set (config file or {})",
                crate::config::CONSUMER_SECRET_ENV
            ))
        })?;

        let transport = ReqwestTransport::new(config.user_agent(), config.timeout())
            .map_err(|e| ConfigError::InvalidValue(format!("cannot build HTTP client: {}", e)))?;
        let store = secrets::create_store(config.secrets_provider(), config.secrets_directory())
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let authorizer = Authorizer::new(
            config.auth_config(),
            ConsumerCredentials::new(key, secret),
            Arc::new(transport),
            consent,
            CredentialStore::with_record_name(Arc::from(store), config.record_name()),
        );

        Ok(Self::new(authorizer, config.api_endpoints()))
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub fn is_authorized(&self) -> bool {
        self.authorizer.is_authorized()
    }

    pub fn state(&self) -> AuthorizationState {
        self.authorizer.state()
    }

    pub fn screen_name(&self) -> Option<&str> {
        self.authorizer.screen_name()
    }

    /// Run the handshake unless already authorized.
    pub async fn authorize(&mut self) -> Result<AuthStatus, AuthError> {
        self.authorizer.authorize().await
    }

    /// Forget the access token, in memory and in the store.
    pub fn deauthorize(&mut self) -> DeauthStatus {
        self.authorizer.deauthorize()
    }

    /// Perform one signed request.
    ///
    /// Authorizes first when needed; if that fails no API request is made.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`]: authorization was needed and failed
    /// - [`ApiError::Encoding`]: the URL cannot be signed
    /// - [`ApiError::Transport`]: no response
    /// - [`ApiError::Http`]: non-2xx response
    pub async fn call(
        &mut self,
        url: &str,
        method: HttpMethod,
        params: &[(String, String)],
    ) -> Result<ApiResponse, ApiError> {
        self.authorizer.authorize().await?;

        let request = RequestBuilder::new(self.authorizer.credentials())
            .build(url, method, params, &[])?
            .to_header_request();

        tracing::debug!(method = %method, url = %request.url_without_query(), "signed API call");
        let response = self.authorizer.transport().send(request).await?;

        if response.is_success() {
            return Ok(ApiResponse {
                status: response.status,
                body: response.body,
            });
        }

        if response.is_unauthorized() {
            tracing::warn!(status = response.status, url, "access token rejected");
        } else {
            tracing::warn!(status = response.status, url, "API request failed");
        }
        Err(ApiError::Http {
            status: response.status,
            body: response.body,
        })
    }

    /// Fetch the home timeline.
    pub async fn get_timeline(&mut self, query: &TimelineQuery) -> Result<Vec<Status>, ApiError> {
        let url = self.endpoints.home_timeline.clone();
        self.call(&url, HttpMethod::Get, &query.to_params())
            .await?
            .json()
    }

    /// Post a status.
    ///
    /// Empty, whitespace-only or over-long text is rejected before any
    /// authorization or network activity.
    pub async fn post_status(&mut self, text: &str) -> Result<Status, ApiError> {
        types::validate_status_text(text)?;

        let url = self.endpoints.update_status.clone();
        self.call(
            &url,
            HttpMethod::Post,
            &[("status".to_string(), text.to_string())],
        )
        .await?
        .json()
    }
}
