//! auth::machine
//!
//! The three-legged authorization state machine.
//!
//! # Design
//!
//! [`Authorizer`] owns the live [`Credentials`] and the current
//! [`AuthorizationState`]. `authorize` drives the handshake:
//!
//! 1. **Request token**: signed POST with every parameter in the query
//!    string, `oauth_callback` included when configured.
//! 2. **Consent**: the consent capability shows
//!    `<authorize>?oauth_token=<request token>` and reports the outcome.
//! 3. **Access token**: signed POST with the `Authorization` header, signed
//!    with the request token secret and carrying `oauth_verifier`.
//!
//! The access pair is persisted before the state becomes `Authorized`. Any
//! failure discards every handshake artifact and returns to `Unauthorized`.
//!
//! Handshakes are serialized by `&mut self`: a second `authorize` cannot be
//! started while one is awaiting.
//!
//! # Example
//!
//! ```ignore
//! let mut authorizer = Authorizer::new(config, consumer, transport, consent, store);
//! match authorizer.authorize().await? {
//!     AuthStatus::Authorized => println!("welcome"),
//!     AuthStatus::AlreadyAuthorized => {}
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::consent::{authorize_url, extract_verifier, ConsentProvider};
use super::errors::{AuthError, ACCESS_TOKEN_LEG, REQUEST_TOKEN_LEG};
use super::state::AuthorizationState;
use super::store::CredentialStore;
use crate::oauth::{ConsumerCredentials, Credentials, RequestBuilder, TokenPair};
use crate::transport::{HttpMethod, HttpResponse, Transport};

pub const DEFAULT_REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authorize";
pub const DEFAULT_ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";

/// Conventional `oauth_callback` value for the PIN flow.
pub const OUT_OF_BAND: &str = "oob";

/// Handshake endpoints and callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub request_token_url: String,
    pub authorize_url: String,
    pub access_token_url: String,
    /// Sent as `oauth_callback` on the request-token leg when set.
    pub callback_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            request_token_url: DEFAULT_REQUEST_TOKEN_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            access_token_url: DEFAULT_ACCESS_TOKEN_URL.to_string(),
            callback_url: Some(OUT_OF_BAND.to_string()),
        }
    }
}

/// Result of a successful `authorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// A handshake ran and the new access token is persisted.
    Authorized,
    /// An access token was already held; nothing happened.
    AlreadyAuthorized,
}

/// Result of `deauthorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeauthStatus {
    Deauthorized,
    AlreadyDeauthorized,
}

/// Form-encoded reply to the request-token and access-token legs.
#[derive(Deserialize)]
struct TokenResponse {
    oauth_token: Option<String>,
    oauth_token_secret: Option<String>,
    oauth_callback_confirmed: Option<String>,
    user_id: Option<String>,
    screen_name: Option<String>,
}

impl TokenResponse {
    fn parse(leg: &'static str, response: &HttpResponse) -> Result<Self, AuthError> {
        if !response.is_success() {
            return Err(AuthError::leg_rejected(leg, response.status, &response.body));
        }
        serde_urlencoded::from_str(response.body.trim()).map_err(|e| {
            AuthError::Protocol(format!("cannot decode {} response: {}", leg, e))
        })
    }

    fn take_pair(&mut self, leg: &str) -> Result<TokenPair, AuthError> {
        let token = self.oauth_token.take().unwrap_or_default();
        let secret = self.oauth_token_secret.take().unwrap_or_default();
        TokenPair::new(token, secret).ok_or_else(|| {
            AuthError::Protocol(format!(
                "{} response lacks oauth_token or oauth_token_secret",
                leg
            ))
        })
    }
}

/// Drives the handshake and owns the live credentials.
pub struct Authorizer {
    config: AuthConfig,
    credentials: Credentials,
    state: AuthorizationState,
    transport: Arc<dyn Transport>,
    consent: Arc<dyn ConsentProvider>,
    store: CredentialStore,
}

impl Authorizer {
    /// Create an authorizer, restoring a persisted access token if one is
    /// stored.
    pub fn new(
        config: AuthConfig,
        consumer: ConsumerCredentials,
        transport: Arc<dyn Transport>,
        consent: Arc<dyn ConsentProvider>,
        store: CredentialStore,
    ) -> Self {
        let mut credentials = Credentials::new(consumer);
        let state = match store.load() {
            Some(pair) => {
                credentials.set_access_token(pair);
                AuthorizationState::Authorized
            }
            None => AuthorizationState::Unauthorized,
        };
        tracing::debug!(state = %state, transport = transport.name(), "authorizer ready");

        Self {
            config,
            credentials,
            state,
            transport,
            consent,
            store,
        }
    }

    pub fn state(&self) -> AuthorizationState {
        self.state
    }

    pub fn is_authorized(&self) -> bool {
        self.state == AuthorizationState::Authorized
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Screen name from the last completed handshake in this session.
    pub fn screen_name(&self) -> Option<&str> {
        self.credentials.screen_name()
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Run the handshake unless already authorized.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Transport`]: a leg got no response or a non-2xx one
    /// - [`AuthError::Protocol`]: a leg's response lacked the token pair
    /// - [`AuthError::ConsentDenied`]: consent produced no verifier
    /// - [`AuthError::Persistence`]: the access token could not be saved
    ///
    /// On any error the state is `Unauthorized` and nothing was persisted.
    pub async fn authorize(&mut self) -> Result<AuthStatus, AuthError> {
        if self.is_authorized() {
            tracing::debug!("already authorized");
            return Ok(AuthStatus::AlreadyAuthorized);
        }
        if self.state.is_in_progress() {
            // Left behind by a handshake future that was dropped mid-flight.
            tracing::debug!(state = %self.state, "discarding abandoned handshake");
            self.reset();
        }

        match self.run_handshake().await {
            Ok(()) => {
                tracing::info!(
                    screen_name = self.credentials.screen_name().unwrap_or("unknown"),
                    "authorization complete"
                );
                Ok(AuthStatus::Authorized)
            }
            Err(e) => {
                if matches!(e, AuthError::ConsentDenied) {
                    tracing::warn!("user denied authorization");
                } else {
                    tracing::warn!(state = %self.state, error = %e, "authorization failed");
                }
                self.reset();
                Err(e)
            }
        }
    }

    /// Drop the access token, in memory and in the store.
    ///
    /// Deleting the persisted record is best-effort: a failure is logged and
    /// the in-memory state is cleared regardless.
    pub fn deauthorize(&mut self) -> DeauthStatus {
        if !self.is_authorized() {
            self.reset();
            return DeauthStatus::AlreadyDeauthorized;
        }

        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "cannot delete persisted credentials");
        }
        self.reset();
        tracing::info!("deauthorized");
        DeauthStatus::Deauthorized
    }

    async fn run_handshake(&mut self) -> Result<(), AuthError> {
        self.transition(AuthorizationState::RequestTokenPending);
        let request_token = self.fetch_request_token().await?;
        let token = request_token.token().to_string();
        self.credentials.set_request_token(request_token);

        self.transition(AuthorizationState::AwaitingUserConsent);
        let url = authorize_url(&self.config.authorize_url, &token);
        let outcome = self.consent.request_consent(&url).await;
        let verifier = extract_verifier(&outcome, &token).ok_or(AuthError::ConsentDenied)?;
        self.credentials.set_verifier(verifier);

        self.transition(AuthorizationState::AccessTokenPending);
        let access = self.fetch_access_token().await?;
        self.store.save(&access)?;

        self.credentials.clear_handshake();
        self.credentials.set_access_token(access);
        self.transition(AuthorizationState::Authorized);
        Ok(())
    }

    async fn fetch_request_token(&mut self) -> Result<TokenPair, AuthError> {
        let extra: Vec<(String, String)> = self
            .config
            .callback_url
            .iter()
            .map(|cb| ("oauth_callback".to_string(), cb.clone()))
            .collect();

        let request = RequestBuilder::new(&self.credentials)
            .build(
                &self.config.request_token_url,
                HttpMethod::Post,
                &[],
                &extra,
            )?
            .to_query_request();

        tracing::debug!(url = %self.config.request_token_url, "requesting request token");
        let response = self.transport.send(request).await?;
        let mut reply = TokenResponse::parse(REQUEST_TOKEN_LEG, &response)?;
        let pair = reply.take_pair(REQUEST_TOKEN_LEG)?;

        if self.config.callback_url.is_some()
            && reply.oauth_callback_confirmed.as_deref() != Some("true")
        {
            tracing::warn!("provider did not confirm the callback");
        }
        Ok(pair)
    }

    async fn fetch_access_token(&mut self) -> Result<TokenPair, AuthError> {
        // Single use: gone after this leg whatever the outcome.
        let verifier = self
            .credentials
            .take_verifier()
            .ok_or(AuthError::ConsentDenied)?;

        let request = RequestBuilder::new(&self.credentials)
            .build(
                &self.config.access_token_url,
                HttpMethod::Post,
                &[],
                &[("oauth_verifier".to_string(), verifier)],
            )?
            .to_header_request();

        tracing::debug!(url = %self.config.access_token_url, "exchanging verifier for access token");
        let response = self.transport.send(request).await?;
        let mut reply = TokenResponse::parse(ACCESS_TOKEN_LEG, &response)?;
        let pair = reply.take_pair(ACCESS_TOKEN_LEG)?;

        self.credentials
            .set_identity(reply.user_id.take(), reply.screen_name.take());
        Ok(pair)
    }

    fn transition(&mut self, next: AuthorizationState) {
        assert!(
            self.state.can_transition_to(next),
            "illegal authorization transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "authorization state");
        self.state = next;
    }

    fn reset(&mut self) {
        self.credentials.clear_handshake();
        self.credentials.clear_access();
        if self.state != AuthorizationState::Unauthorized {
            self.transition(AuthorizationState::Unauthorized);
        }
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("transport", &self.transport.name())
            .field("store", &self.store)
            .finish()
    }
}
