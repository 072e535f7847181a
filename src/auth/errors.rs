//! auth::errors
//!
//! Error types for the three-legged authorization handshake.
//!
//! # Design
//!
//! Error messages never contain token values. Provider bodies are included
//! only when a leg fails with a non-2xx status, and those bodies are the
//! provider's own error text.
//!
//! # Example
//!
//! ```
//! use birdhouse::auth::AuthError;
//!
//! let err = AuthError::ConsentDenied;
//! assert!(err.needs_reauth());
//! assert!(err.to_string().contains("denied"));
//! ```

use thiserror::Error;

use crate::oauth::OAuthError;
use crate::transport::TransportError;

/// Leg name of the request-token exchange.
pub const REQUEST_TOKEN_LEG: &str = "request-token";
/// Leg name of the verifier-for-access-token exchange.
pub const ACCESS_TOKEN_LEG: &str = "access-token";

/// Errors from authorization operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No response from the provider.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A handshake leg answered with a non-2xx status.
    #[error("{leg} request rejected with HTTP {status}: {body}")]
    Rejected {
        leg: &'static str,
        status: u16,
        body: String,
    },

    /// The provider answered but the answer is unusable (missing token
    /// fields, undecodable body).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The user declined, closed the consent surface, or consent ended
    /// without a verifier.
    #[error("authorization denied by user")]
    ConsentDenied,

    /// The access token was obtained but could not be persisted.
    #[error("cannot persist access token: {0}")]
    Persistence(String),

    /// A request could not be signed.
    #[error(transparent)]
    Encoding(#[from] OAuthError),
}

impl AuthError {
    /// Check if running `birdhouse auth login` again is the remedy.
    ///
    /// A 4xx on the access-token leg usually means a stale or mistyped
    /// verifier.
    pub fn needs_reauth(&self) -> bool {
        match self {
            AuthError::ConsentDenied | AuthError::Protocol(_) => true,
            AuthError::Rejected { leg, status, .. } => {
                *leg == ACCESS_TOKEN_LEG && (400..500).contains(status) && *status != 429
            }
            _ => false,
        }
    }

    /// Check if this failure might succeed on retry.
    ///
    /// Provider rejections are deterministic except for 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Transport(TransportError::Network(_) | TransportError::Timeout) => true,
            AuthError::Rejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// The HTTP status of a rejected leg.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A non-2xx reply to a handshake leg.
    pub(crate) fn leg_rejected(leg: &'static str, status: u16, body: &str) -> Self {
        AuthError::Rejected {
            leg,
            status,
            body: body.trim().to_string(),
        }
    }
}

impl From<crate::secrets::SecretError> for AuthError {
    fn from(err: crate::secrets::SecretError) -> Self {
        AuthError::Persistence(err.to_string())
    }
}
