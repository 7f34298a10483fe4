//! HTTP transport abstraction and the reqwest-backed implementation.

use std::fmt::Debug;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use netstorage_core::{Error, Result};
use tokio_util::io::ReaderStream;

use crate::body::Body;

/// HttpSend is used to send the signed request over the network.
///
/// Transport-level failures (connection reset, DNS, timeout) must surface
/// as errors; a response with a non-success status is NOT a transport
/// failure and must be returned as a response. The execution engine relies
/// on this distinction when classifying and retrying.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send one http request and return the response with a buffered body.
    async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>>;
}

/// Transport construction options.
///
/// These replace the process-wide toggles the CMS API kit historically
/// relied on; every client instance gets its own explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Total per-attempt timeout. `None` leaves the request unlimited,
    /// which large uploads over slow links need.
    pub request_timeout: Option<Duration>,
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Option<Duration>,
}

impl TransportOptions {
    /// Set the total per-attempt timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

/// [`HttpSend`] implementation backed by a `reqwest::Client`.
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: reqwest::Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend from an existing `reqwest::Client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client from explicit transport options.
    pub fn with_options(options: TransportOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::transport_failure("failed to build http client").with_source(e))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let body = match body {
            Body::Empty => reqwest::Body::from(Bytes::new()),
            Body::Bytes(b) => reqwest::Body::from(b),
            // The engine already set Content-Length when the length is
            // known; an unsized stream goes out chunked.
            Body::Stream { reader, .. } => reqwest::Body::wrap_stream(ReaderStream::new(reader)),
        };
        let req = reqwest::Request::try_from(http::Request::from_parts(parts, body))
            .map_err(|e| Error::transport_failure("invalid outbound request").with_source(e))?;

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport_failure(format!("request failed: {e}")).with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| {
                Error::transport_failure("failed reading response body").with_source(e)
            })?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
