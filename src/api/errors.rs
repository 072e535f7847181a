//! api::errors

use thiserror::Error;

use crate::auth::AuthError;
use crate::oauth::OAuthError;
use crate::transport::TransportError;

/// Errors from API operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authorization was required and did not succeed. No call was made.
    #[error("not authorized: {0}")]
    Auth(#[from] AuthError),

    /// No response from the API.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with a non-2xx status.
    #[error("API request failed with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx body that does not have the expected shape.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// Status text rejected before sending.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// The request could not be signed.
    #[error(transparent)]
    Encoding(#[from] OAuthError),
}

impl ApiError {
    /// The provider rejected the access token (HTTP 401).
    ///
    /// The session stays authorized; run `birdhouse auth logout` and log in
    /// again to replace a revoked token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display() {
        let err = ApiError::Http {
            status: 403,
            body: "{\"errors\":[]}".into(),
        };
        assert!(err.to_string().contains("403"));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_classification() {
        assert!(ApiError::Http {
            status: 401,
            body: String::new()
        }
        .is_unauthorized());
        assert!(!ApiError::Auth(AuthError::ConsentDenied).is_unauthorized());
    }

    #[test]
    fn from_auth_error() {
        let err: ApiError = AuthError::ConsentDenied.into();
        assert!(err.to_string().contains("denied"));
    }
}
