//! Common test utilities and fixtures for integration tests
//!
//! Contains a scripted transport and sample response bodies in the shape
//! Kraken's REST API returns them.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use krakgov::{ClientConfig, HttpRequest, HttpResponse, KrakenClient, Transport, TransportError};
use parking_lot::Mutex;

/// Sample server time response
pub const TIME_RESPONSE: &str = r#"{
    "error": [],
    "result": {"unixtime": 1688669448, "rfc1123": "Thu, 06 Jul 23 18:50:48 +0000"}
}"#;

/// Sample balance response
pub const BALANCE_RESPONSE: &str = r#"{
    "error": [],
    "result": {"ZUSD": "171288.6158", "XXBT": "0.0000000000", "XETH": "3.1000000000"}
}"#;

/// Sample ticker response
pub const TICKER_RESPONSE: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": {
            "a": ["30300.10000", "1", "1.000"],
            "b": ["30300.00000", "1", "1.000"],
            "c": ["30303.20000", "0.00067643"],
            "v": ["4083.67001100", "4412.73601799"],
            "p": ["30706.77771", "30689.13205"],
            "t": [34619, 38907],
            "l": ["29868.30000", "29868.30000"],
            "h": ["31631.00000", "31631.00000"],
            "o": "30502.80000"
        }
    }
}"#;

/// Sample OHLC response
pub const OHLC_RESPONSE: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": [
            [1688671200, "30306.1", "30306.2", "30305.7", "30305.7", "30306.1", "3.39243896", 23],
            [1688671260, "30304.5", "30304.5", "30300.0", "30300.0", "30300.3", "4.42996871", 18]
        ],
        "last": 1688672160
    }
}"#;

/// Sample order book response
pub const DEPTH_RESPONSE: &str = r#"{
    "error": [],
    "result": {
        "XXBTZUSD": {
            "asks": [["30384.10000", "2.059", 1688671659], ["30387.90000", "1.500", 1688671380]],
            "bids": [["30297.00000", "1.115", 1688671636], ["30296.70000", "2.002", 1688671674]]
        }
    }
}"#;

/// Sample AddOrder response
pub const ADD_ORDER_RESPONSE: &str = r#"{
    "error": [],
    "result": {
        "descr": {"order": "buy 1.25000000 XBTUSD @ limit 27500.0"},
        "txid": ["OU22CG-KLAF2-FWUDD7"]
    }
}"#;

/// Envelope with an empty result
pub const EMPTY_RESULT: &str = r#"{"error": [], "result": {}}"#;

/// Envelope carrying an exchange error
pub fn error_response(error: &str) -> String {
    format!(r#"{{"error": ["{error}"]}}"#)
}

/// What the mock answers with next
#[derive(Debug)]
pub enum Scripted {
    Response(HttpResponse),
    Failure(TransportError),
}

/// Transport that replays scripted responses and records requests
///
/// Once the script is exhausted every call gets `fallback`, or a 200 with
/// an empty result when none is set.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<(u16, String)>>,
    requests: Mutex<Vec<HttpRequest>>,
    renewals: AtomicUsize,
    closed: Mutex<bool>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response with the given status and body
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        let body: String = body.into();
        self.script
            .lock()
            .push_back(Scripted::Response(HttpResponse::new(status, body.into_bytes())));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, error: TransportError) -> &Self {
        self.script.lock().push_back(Scripted::Failure(error));
        self
    }

    /// Answer every unscripted call with this status and body
    pub fn always(&self, status: u16, body: impl Into<String>) {
        *self.fallback.lock() = Some((status, body.into()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn renewals(&self) -> usize {
        self.renewals.load(Ordering::SeqCst)
    }

    /// Form body of the `n`th request, decoded into pairs
    pub fn form(&self, n: usize) -> Vec<(String, String)> {
        let body = self.requests.lock()[n].body.clone();
        serde_urlencoded::from_str(&body).unwrap()
    }

    pub fn header(&self, n: usize, name: &str) -> Option<String> {
        self.requests.lock()[n]
            .headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if *self.closed.lock() {
            return Err(TransportError::Closed);
        }
        self.requests.lock().push(request);

        if let Some(next) = self.script.lock().pop_front() {
            return match next {
                Scripted::Response(response) => Ok(response),
                Scripted::Failure(error) => Err(error),
            };
        }

        let (status, body) = self
            .fallback
            .lock()
            .clone()
            .unwrap_or((200, EMPTY_RESULT.to_string()));
        Ok(HttpResponse::new(status, body.into_bytes()))
    }

    async fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connection("GET is not scripted".to_string()))
    }

    fn renew(&self) -> Result<(), TransportError> {
        if *self.closed.lock() {
            return Err(TransportError::Closed);
        }
        self.renewals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        *self.closed.lock() = true;
    }
}

/// Base64 of "test_private_key"
pub const TEST_PRIVATE_KEY: &str = "dGVzdF9wcml2YXRlX2tleQ==";

/// Configuration with test credentials and a one-second retry interval
pub fn private_config() -> ClientConfig {
    ClientConfig::new()
        .with_credentials(krakgov::Credentials::new("TEST_KEY", TEST_PRIVATE_KEY))
        .with_retry_interval(Duration::from_secs(1))
}

/// Public-only configuration with a one-second retry interval
pub fn public_config() -> ClientConfig {
    ClientConfig::new().with_retry_interval(Duration::from_secs(1))
}

/// Client over `transport`
pub fn client(config: ClientConfig, transport: &Arc<MockTransport>) -> KrakenClient {
    KrakenClient::with_transport(config, transport.clone()).unwrap()
}
