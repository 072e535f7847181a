//! auth - OAuth 1.0a three-legged authorization
//!
//! # Architecture
//!
//! The auth system:
//! - Obtains a request token, has the user approve it, and exchanges it for
//!   an access token
//! - Persists the access token pair through a [`SecretStore`](crate::secrets::SecretStore)
//! - Restores a persisted pair at startup
//! - Never exposes tokens in logs, errors, or debug output
//!
//! # Components
//!
//! - [`Authorizer`] - the handshake state machine
//! - [`AuthorizationState`] - explicit handshake state
//! - [`CredentialStore`] - the persisted `{access_token, access_token_secret}` record
//! - [`ConsentProvider`] - capability that shows the authorize page to the user
//!
//! # Example
//!
//! ```ignore
//! use birdhouse::auth::{Authorizer, AuthConfig, CredentialStore};
//!
//! let store = CredentialStore::new(Arc::from(secrets::create_store("file", None)?));
//! let mut authorizer = Authorizer::new(AuthConfig::default(), consumer, transport, consent, store);
//! authorizer.authorize().await?;
//! ```

pub mod consent;
mod errors;
mod machine;
mod state;
mod store;

pub use consent::{ConsentOutcome, ConsentProvider, ScriptedConsent};
pub use errors::AuthError;
pub use machine::{
    AuthConfig, AuthStatus, Authorizer, DeauthStatus, DEFAULT_ACCESS_TOKEN_URL,
    DEFAULT_AUTHORIZE_URL, DEFAULT_REQUEST_TOKEN_URL, OUT_OF_BAND,
};
pub use state::AuthorizationState;
pub use store::{CredentialStore, StoredCredentials, DEFAULT_RECORD_NAME};
