//! oauth::credentials
//!
//! The single live credential set: consumer identity plus whatever tokens
//! the handshake has produced so far.
//!
//! # Design
//!
//! Presence carries meaning, so every optional field is an `Option` and the
//! constructors normalize empty strings to `None`. The consumer pair is fixed
//! at construction; everything else is produced and replaced by the
//! handshake legs.
//!
//! # Security
//!
//! Secrets and tokens never appear in `Debug` output. All types here
//! implement `Debug` by hand and print `[REDACTED]` for token material.

use std::fmt;

/// Application identity with the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
    key: String,
    secret: String,
}

impl ConsumerCredentials {
    /// Create consumer credentials.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// The consumer key (sent as `oauth_consumer_key`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The consumer secret (only ever used as signing key material).
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A token and its secret. Used for both request and access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    token: String,
    secret: String,
}

impl TokenPair {
    /// Create a pair. Returns `None` if either half is empty.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let secret = secret.into();
        if token.is_empty() || secret.is_empty() {
            None
        } else {
            Some(Self { token, secret })
        }
    }

    /// The token (sent as `oauth_token`).
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The token secret (signing key material).
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// The live credential set.
#[derive(Clone)]
pub struct Credentials {
    consumer: ConsumerCredentials,
    request_token: Option<TokenPair>,
    verifier: Option<String>,
    access_token: Option<TokenPair>,
    user_id: Option<String>,
    screen_name: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Credentials {
    /// Start with only the consumer identity.
    pub fn new(consumer: ConsumerCredentials) -> Self {
        Self {
            consumer,
            request_token: None,
            verifier: None,
            access_token: None,
            user_id: None,
            screen_name: None,
        }
    }

    /// Builder-style access token, for restoring persisted state.
    pub fn with_access_token(mut self, access: TokenPair) -> Self {
        self.access_token = Some(access);
        self
    }

    pub fn consumer(&self) -> &ConsumerCredentials {
        &self.consumer
    }

    pub fn request_token(&self) -> Option<&TokenPair> {
        self.request_token.as_ref()
    }

    pub fn verifier(&self) -> Option<&str> {
        self.verifier.as_deref()
    }

    pub fn access_token(&self) -> Option<&TokenPair> {
        self.access_token.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn screen_name(&self) -> Option<&str> {
        self.screen_name.as_deref()
    }

    /// The token that signs the next request: the access token once present,
    /// otherwise the request token during the handshake.
    pub fn signing_token(&self) -> Option<&TokenPair> {
        self.access_token.as_ref().or(self.request_token.as_ref())
    }

    pub fn set_request_token(&mut self, token: TokenPair) {
        self.request_token = Some(token);
    }

    /// Record the verifier. An empty verifier is treated as absent.
    pub fn set_verifier(&mut self, verifier: impl Into<String>) {
        self.verifier = non_empty(verifier.into());
    }

    /// Remove and return the verifier. It is single use.
    pub fn take_verifier(&mut self) -> Option<String> {
        self.verifier.take()
    }

    pub fn set_access_token(&mut self, token: TokenPair) {
        self.access_token = Some(token);
    }

    /// Record the account identity returned with the access token.
    pub fn set_identity(&mut self, user_id: Option<String>, screen_name: Option<String>) {
        self.user_id = user_id.and_then(non_empty);
        self.screen_name = screen_name.and_then(non_empty);
    }

    /// Drop request-token and verifier state.
    pub fn clear_handshake(&mut self) {
        self.request_token = None;
        self.verifier = None;
    }

    /// Drop the access token and the identity that came with it.
    pub fn clear_access(&mut self) {
        self.access_token = None;
        self.user_id = None;
        self.screen_name = None;
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer", &self.consumer)
            .field("has_request_token", &self.request_token.is_some())
            .field("has_verifier", &self.verifier.is_some())
            .field("has_access_token", &self.access_token.is_some())
            .field("user_id", &self.user_id)
            .field("screen_name", &self.screen_name)
            .finish()
    }
}
