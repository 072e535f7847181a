//! transport
//!
//! The HTTP capability the OAuth core sends requests through.
//!
//! # Design
//!
//! The core never talks to the network directly. Every leg of the handshake
//! and every signed API call is expressed as an [`HttpRequest`] and handed to
//! a [`Transport`]. The transport performs the exchange and returns the raw
//! status and body, or a [`TransportError`] when no response was obtained.
//!
//! Non-2xx statuses are *responses*, not transport errors. Callers decide how
//! to treat them.
//!
//! # Implementations
//!
//! - [`http::ReqwestTransport`]: production transport over `reqwest`
//! - [`mock::MockTransport`]: scripted responses for deterministic tests
//!
//! # Example
//!
//! ```ignore
//! use birdhouse::transport::{HttpMethod, HttpRequest, Transport};
//!
//! async fn ping(transport: &dyn Transport) -> Result<u16, TransportError> {
//!     let response = transport
//!         .send(HttpRequest::new(HttpMethod::Get, "https://api.example.com/ping"))
//!         .await?;
//!     Ok(response.status)
//! }
//! ```

pub mod http;
pub mod mock;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

/// Header carrying the OAuth signature and parameters.
pub const AUTHORIZATION: &str = "Authorization";

/// Header describing the request body encoding.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Content type for form-encoded POST bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors from the transport layer.
///
/// These mean no HTTP response was obtained at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be constructed (bad URL, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// HTTP methods accepted by the OAuth core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Uppercase method name as it appears in the signature base string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a method other than GET or POST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method '{0}' (expected GET or POST)")]
pub struct ParseMethodError(pub String);

impl FromStr for HttpMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(HttpMethod::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(HttpMethod::Post)
        } else {
            Err(ParseMethodError(s.to_string()))
        }
    }
}

/// A fully rendered request ready to hand to a [`Transport`].
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute URL including any query string.
    pub url: String,
    /// Extra headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query string removed.
    pub fn url_without_query(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

// The Authorization header carries the token; keep it out of debug output.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(AUTHORIZATION) {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url_without_query())
            .field("headers", &headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Raw response returned by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check for 401 Unauthorized.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// The transport capability.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the core holds them behind `Arc`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Perform one HTTP exchange.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
