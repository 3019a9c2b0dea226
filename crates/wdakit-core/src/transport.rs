//! HTTP transport for WDA requests.
//!
//! [`Transport`] is the seam between the typed session API and the network:
//! it sends one GET/POST/DELETE and returns the raw [`WdaResponse`] envelope,
//! leaving server error checks and decoding to the caller. [`HttpTransport`]
//! is the `reqwest`-backed implementation used by default.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wdakit_core::config::WdaConfig;
//! use wdakit_core::session::Session;
//! use wdakit_core::transport::HttpTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::from_config(&WdaConfig::default())?;
//! let session = Session::with_transport(
//!     "http://localhost:8100/session/8BF16568",
//!     Arc::new(transport),
//! )?;
//! let size = session.window_size().await?;
//! println!("{}x{}", size.width, size.height);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug_span, trace, Instrument};
use url::Url;

use crate::body::WdaBody;
use crate::config::WdaConfig;
use crate::error::{Result, WdaError};
use crate::response::WdaResponse;

/// Sends requests to a WDA server.
///
/// `endpoint` is a short static name for the operation, used only for
/// tracing. Implementations must not interpret the envelope: a reply that
/// carries a server error is still returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &'static str, url: &Url) -> Result<WdaResponse>;

    async fn post(&self, endpoint: &'static str, url: &Url, body: &WdaBody) -> Result<WdaResponse>;

    async fn delete(&self, endpoint: &'static str, url: &Url) -> Result<WdaResponse>;
}

/// A [`Transport`] over HTTP/1.1 using `reqwest`.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the default timeouts from [`WdaConfig`].
    pub fn new() -> Result<Self> {
        Self::from_config(&WdaConfig::default())
    }

    /// Creates a transport using the timeouts in `config`.
    pub fn from_config(config: &WdaConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| WdaError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(
        &self,
        endpoint: &'static str,
        method: Method,
        request: RequestBuilder,
    ) -> Result<WdaResponse> {
        let span = debug_span!("wda_request", endpoint, method = %method);
        async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            trace!(status, body_bytes = text.len(), "response received");
            WdaResponse::parse(status, &text)
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &'static str, url: &Url) -> Result<WdaResponse> {
        trace!(%url, "GET");
        let request = self.client.get(url.clone());
        self.execute(endpoint, Method::GET, request).await
    }

    async fn post(&self, endpoint: &'static str, url: &Url, body: &WdaBody) -> Result<WdaResponse> {
        trace!(%url, body = %body, "POST");
        let request = self.client.post(url.clone()).json(body);
        self.execute(endpoint, Method::POST, request).await
    }

    async fn delete(&self, endpoint: &'static str, url: &Url) -> Result<WdaResponse> {
        trace!(%url, "DELETE");
        let request = self.client.delete(url.clone());
        self.execute(endpoint, Method::DELETE, request).await
    }
}
