//! oauth::errors
//!
//! Error type for signing and request construction.

use thiserror::Error;

/// Errors from the signature engine and request builder.
///
/// These never carry secret material: only URLs, parameter names and
/// decoder messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthError {
    /// Input that cannot be canonicalized (bad URL, undecodable query).
    #[error("cannot canonicalize request: {0}")]
    Encoding(String),
}
