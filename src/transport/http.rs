//! transport::http
//!
//! Production transport backed by `reqwest`.
//!
//! # Design
//!
//! - One shared `reqwest::Client` (connection pooling, TLS)
//! - A per-client timeout; expiry maps to [`TransportError::Timeout`]
//! - Error messages are stripped of the request URL, which may carry
//!   oauth_* query parameters on the request-token leg
//!
//! # Example
//!
//! ```ignore
//! use birdhouse::transport::http::ReqwestTransport;
//! use std::time::Duration;
//!
//! let transport = ReqwestTransport::new("birdhouse/0.2", Duration::from_secs(30))?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use super::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// Default User-Agent header value.
pub const DEFAULT_USER_AGENT: &str = concat!("birdhouse/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given User-Agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the User-Agent is not a
    /// valid header value, or [`TransportError::Network`] if the TLS backend
    /// cannot be initialized.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| TransportError::InvalidRequest(format!("bad user agent: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.without_url().to_string()))?;

        Ok(Self { client })
    }

    fn build_headers(request: &HttpRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("bad header name: {}", e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::InvalidRequest(format!("bad value for header {}: {}", name, e))
            })?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.without_url().to_string())
    } else {
        TransportError::Network(err.without_url().to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = Self::build_headers(&request)?;

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        let builder = builder.headers(headers);
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}
