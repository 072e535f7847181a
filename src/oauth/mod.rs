//! oauth
//!
//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! # Modules
//!
//! - [`encoding`]: RFC 3986 percent-encoding and URL splitting
//! - [`signature`]: base string and HMAC-SHA1 signature
//! - [`request`]: protocol parameters, freshness, and request rendering
//! - [`credentials`]: consumer identity and handshake tokens
//! - [`errors`]: [`OAuthError`]
//!
//! Nothing in this module performs I/O.

pub mod credentials;
pub mod encoding;
pub mod errors;
pub mod request;
pub mod signature;

pub use credentials::{ConsumerCredentials, Credentials, TokenPair};
pub use errors::OAuthError;
pub use request::{Freshness, RequestBuilder, SignedRequest};
pub use signature::sign;
