//! transport::mock
//!
//! Scripted transport for deterministic testing.
//!
//! # Design
//!
//! Responses are queued per `(method, url-without-query)` route and served in
//! FIFO order. Every request is recorded so tests can assert on what the core
//! actually sent (headers, query, body). A request with no scripted response
//! fails with [`TransportError::Network`].
//!
//! # Example
//!
//! ```
//! use birdhouse::transport::mock::MockTransport;
//! use birdhouse::transport::{HttpMethod, HttpRequest, Transport};
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new();
//! transport.respond(HttpMethod::Get, "https://api.example.com/ping", 200, "pong");
//!
//! let response = transport
//!     .send(HttpRequest::new(HttpMethod::Get, "https://api.example.com/ping?x=1"))
//!     .await
//!     .unwrap();
//! assert_eq!(response.body, "pong");
//! assert_eq!(transport.requests().len(), 1);
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

type Route = (HttpMethod, String);

/// Mock transport for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    /// Scripted results per route.
    scripted: HashMap<Route, VecDeque<Result<HttpResponse, TransportError>>>,
    /// Every request received, in order.
    requests: Vec<HttpRequest>,
}

impl MockTransport {
    /// Create a transport with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a route.
    pub fn respond(&self, method: HttpMethod, url: &str, status: u16, body: &str) -> &Self {
        self.push(method, url, Ok(HttpResponse::new(status, body)))
    }

    /// Queue a transport failure for a route.
    pub fn fail(&self, method: HttpMethod, url: &str, error: TransportError) -> &Self {
        self.push(method, url, Err(error))
    }

    fn push(
        &self,
        method: HttpMethod,
        url: &str,
        result: Result<HttpResponse, TransportError>,
    ) -> &Self {
        let mut inner = self.inner.lock().unwrap();
        inner
            .scripted
            .entry((method, url.to_string()))
            .or_default()
            .push_back(result);
        drop(inner);
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Requests received for one URL (query ignored).
    pub fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
        self.inner
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.url_without_query() == url)
            .cloned()
            .collect()
    }

    /// Number of scripted results not yet consumed.
    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .scripted
            .values()
            .map(VecDeque::len)
            .sum()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        let route = (request.method, request.url_without_query().to_string());
        inner.requests.push(request);

        inner
            .scripted
            .get_mut(&route)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Network(format!(
                    "no scripted response for {} {}",
                    route.0, route.1
                )))
            })
    }
}
