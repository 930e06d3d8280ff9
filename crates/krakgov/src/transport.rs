//! HTTP transport abstraction
//!
//! The dispatcher never talks to `reqwest` directly. It hands an
//! [`HttpRequest`] to a [`Transport`] and gets back a status and a body, which
//! keeps the rate governor testable without a network and lets the
//! connection be routed through a SOCKS proxy (e.g. a local Tor daemon)
//! without the governor noticing.
//!
//! # Example
//!
//! ```no_run
//! use krakgov::transport::{HttpTransport, Transport, TransportSettings};
//!
//! # async fn example() -> Result<(), krakgov::transport::TransportError> {
//! let transport = HttpTransport::new(TransportSettings::default())?;
//! let response = transport.get("https://api.kraken.com/0/public/Time").await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent
pub const DEFAULT_USER_AGENT: &str = concat!("krakgov/", env!("CARGO_PKG_VERSION"));

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server answered with a status outside 200/201/202
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Request failed in flight (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection-level failure reported by a non-reqwest transport
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport was closed by its owner
    #[error("transport closed")]
    Closed,

    /// HTTP client could not be built (bad proxy URL, TLS backend)
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl TransportError {
    /// Whether the dispatcher should retry after this failure
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Http(_) | Self::Connection(_))
    }
}

/// Form POST handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL
    pub url: String,
    /// `application/x-www-form-urlencoded` body
    pub body: String,
    /// Extra headers (`API-Key`, `API-Sign` on private calls)
    pub headers: Vec<(String, String)>,
    /// Per-request timeout overriding the transport default
    pub timeout: Option<Duration>,
}

/// Status and raw body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Kraken answers successful calls with 200, 201 or 202
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201 | 202)
    }
}

/// Trait for HTTP transport abstraction
///
/// Implementations own their connection pool. The dispatcher calls
/// [`renew`](Transport::renew) when session rotation is configured and
/// [`close`](Transport::close) when the client is closed.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a form POST
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Send a GET
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// Replace the underlying session with a fresh one
    fn renew(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Release the session; later calls fail with [`TransportError::Closed`]
    fn close(&self);
}

/// Settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Default request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
    /// SOCKS/HTTP proxy URL; set for the tunneled transport
    pub proxy: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

/// `reqwest`-backed transport, direct or tunneled through a proxy
pub struct HttpTransport {
    settings: TransportSettings,
    client: RwLock<Option<Client>>,
}

impl HttpTransport {
    /// Create a transport from settings
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let client = build_client(&settings)?;

        info!(tunneled = settings.proxy.is_some(), "Created HTTP transport");

        Ok(Self {
            settings,
            client: RwLock::new(Some(client)),
        })
    }

    /// Direct transport with default settings
    pub fn direct() -> Result<Self, TransportError> {
        Self::new(TransportSettings::default())
    }

    /// Transport routed through `proxy_url`, e.g. `socks5h://127.0.0.1:9050`
    pub fn tunneled(proxy_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(TransportSettings {
            proxy: Some(proxy_url.into()),
            ..TransportSettings::default()
        })
    }

    /// Whether requests go through a proxy
    pub fn is_tunneled(&self) -> bool {
        self.settings.proxy.is_some()
    }

    /// Get the settings
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    fn client(&self) -> Result<Client, TransportError> {
        self.client.read().clone().ok_or(TransportError::Closed)
    }
}

fn build_client(settings: &TransportSettings) -> Result<Client, TransportError> {
    let mut builder = Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.as_str());

    if let Some(proxy) = &settings.proxy {
        let proxy = Proxy::all(proxy.as_str()).map_err(|e| TransportError::Build(e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| TransportError::Build(e.to_string()))
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = self.client()?;

        let mut builder = client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(status, bytes = body.len(), "POST completed");

        Ok(HttpResponse { status, body })
    }

    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client()?.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }

    fn renew(&self) -> Result<(), TransportError> {
        let client = build_client(&self.settings)?;
        let mut slot = self.client.write();
        if slot.is_none() {
            return Err(TransportError::Closed);
        }
        *slot = Some(client);

        debug!("Renewed HTTP session");
        Ok(())
    }

    fn close(&self) {
        if self.client.write().take().is_some() {
            info!("Closed HTTP transport");
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("tunneled", &self.is_tunneled())
            .field("closed", &self.client.read().is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_success_statuses() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(201, "").is_success());
        assert!(HttpResponse::new(202, "").is_success());
        assert!(!HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());
        assert!(!HttpResponse::new(502, "").is_success());
    }

    #[test]
    fn test_transient_classification() {
        assert!(TransportError::Status(503).is_transient());
        assert!(TransportError::Connection("reset".into()).is_transient());
        assert!(!TransportError::Closed.is_transient());
        assert!(!TransportError::Build("bad proxy".into()).is_transient());
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let result = HttpTransport::tunneled("gopher://127.0.0.1:70");
        assert!(matches!(result, Err(TransportError::Build(_))));
    }

    #[tokio::test]
    async fn test_post_sends_form_and_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/0/private/Balance")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .header("api-key", "key")
                    .body("nonce=1");
                then.status(200).body(r#"{"error":[],"result":{}}"#);
            })
            .await;

        let transport = HttpTransport::direct().unwrap();
        let response = transport
            .post(HttpRequest {
                url: server.url("/0/private/Balance"),
                body: "nonce=1".to_string(),
                headers: vec![("API-Key".to_string(), "key".to_string())],
                timeout: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"error":[],"result":{}}"#.to_vec());
    }

    #[tokio::test]
    async fn test_closed_transport_refuses_requests() {
        let transport = HttpTransport::direct().unwrap();
        transport.close();

        let result = transport.get("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(TransportError::Closed)));
        assert!(matches!(transport.renew(), Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_renew_keeps_transport_usable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ping");
                then.status(200).body("pong");
            })
            .await;

        let transport = HttpTransport::direct().unwrap();
        transport.renew().unwrap();

        let response = transport.get(&server.url("/ping")).await.unwrap();
        assert_eq!(response.body, b"pong".to_vec());
    }
}
