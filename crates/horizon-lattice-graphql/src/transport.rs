//! HTTP transport used to deliver encoded operations.
//!
//! The engine only needs one thing from the network: POST a body with some
//! headers and hand back the status and the raw response body. Anything that
//! can do that implements [`Transport`]; [`ReqwestTransport`] is the default.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{HeaderMap, StatusCode};

use crate::error::Result;

/// One outgoing POST.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The endpoint URL.
    pub url: String,
    /// Headers sent with the request.
    pub headers: HeaderMap,
    /// The encoded envelope.
    pub body: Bytes,
}

/// The raw result of a round trip.
///
/// Status codes are not interpreted here.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status.
    pub status: StatusCode,
    /// The complete response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// An HTTP-capable client the engine can send operations through.
///
/// Implementations perform exactly one round trip per call and must not
/// retry. Dropping the returned future must abort the request; this is how
/// deadlines and cancellation are enforced.
pub trait Transport: Send + Sync {
    /// Send `request` and return the status and body.
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>> {
        (**self).send(request)
    }
}

/// Configuration for the default transport.
#[derive(Clone, Debug)]
pub struct ReqwestTransportConfig {
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Default user agent.
    pub user_agent: Option<String>,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: Some(format!(
                "HorizonLattice-GraphQL/{} (Rust)",
                env!("CARGO_PKG_VERSION")
            )),
        }
    }
}

/// [`Transport`] backed by a `reqwest` client.
///
/// Cheaply cloneable; clones share the connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&ReqwestTransportConfig::default())
    }

    /// Create a transport with custom configuration.
    pub fn with_config(config: &ReqwestTransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&request.url)
                .headers(request.headers)
                .body(request.body)
                .send()
                .await?;

            let status = response.status();
            let body = response.bytes().await?;
            Ok(TransportResponse { status, body })
        })
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}
