//! Main REST client implementation

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::endpoints::{
    AccountEndpoints, ExportEndpoints, FundingEndpoints, MarketEndpoints, StakingEndpoints,
    TradingEndpoints,
};
use crate::error::RestResult;
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    AddOrderResult, Balances, CancelOrderResult, OrderBook, OrderRequest, Orders, ServerTime,
    TickerInfo,
};

/// Kraken REST API client
///
/// Every call, public or private, goes through one [`Dispatcher`], which
/// charges the shared call-rate counter and retries transient failures.
/// Clones share the dispatcher and therefore the counter.
///
/// # Example
///
/// ```no_run
/// use krakgov::{ClientConfig, KrakenClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = KrakenClient::new()?;
///     let ticker = client.get_ticker("XBTUSD").await?;
///
///     // With authentication for private endpoints
///     let auth_client = KrakenClient::with_config(ClientConfig::from_env()?)?;
///     let balance = auth_client.get_balance().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct KrakenClient {
    dispatcher: Arc<Dispatcher>,
}

impl KrakenClient {
    /// Create a new client without authentication
    ///
    /// Only public endpoints will be available.
    pub fn new() -> RestResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// The HTTP transport is tunneled when the configuration names a proxy.
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let transport = HttpTransport::new(config.transport_settings())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> RestResult<Self> {
        let dispatcher = Dispatcher::new(&config, transport)?;

        info!(
            base_url = %config.base_url,
            authenticated = dispatcher.has_credentials(),
            tunneled = config.proxy.is_some(),
            "Created Kraken REST client"
        );

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Check if the client has credentials for private endpoints
    pub fn has_credentials(&self) -> bool {
        self.dispatcher.has_credentials()
    }

    /// The dispatcher all calls go through
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Requests sent so far, retries included
    pub fn request_count(&self) -> u64 {
        self.dispatcher.request_count()
    }

    /// Current call-rate counter value
    pub fn consumed(&self) -> f64 {
        self.dispatcher.consumed()
    }

    /// Close the underlying transport
    pub fn close(&self) {
        self.dispatcher.close();
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(&self.dispatcher)
    }

    /// Get the server time
    pub async fn get_server_time(&self) -> RestResult<ServerTime> {
        self.market().server_time().await
    }

    /// Get ticker information for a trading pair
    ///
    /// # Arguments
    /// * `pair` - Trading pair (e.g., "XBTUSD", "ETHUSD")
    pub async fn get_ticker(&self, pair: &str) -> RestResult<HashMap<String, TickerInfo>> {
        self.market().ticker(&[pair]).await
    }

    /// Get ticker information for multiple trading pairs
    pub async fn get_tickers(&self, pairs: &[&str]) -> RestResult<HashMap<String, TickerInfo>> {
        self.market().ticker(pairs).await
    }

    /// Get order book depth for a trading pair
    ///
    /// # Arguments
    /// * `pair` - Trading pair
    /// * `count` - Number of price levels (1-500)
    pub async fn get_order_book(&self, pair: &str, count: Option<u16>) -> RestResult<OrderBook> {
        self.market().order_book(pair, count).await
    }

    // ========================================================================
    // Private Account Endpoints
    // ========================================================================

    /// Get account endpoints
    ///
    /// Calls fail with a configuration error when the client has no credentials.
    pub fn account(&self) -> AccountEndpoints<'_> {
        AccountEndpoints::new(&self.dispatcher)
    }

    /// Get account balance
    pub async fn get_balance(&self) -> RestResult<Balances> {
        self.account().balance().await
    }

    /// Get open orders
    pub async fn get_open_orders(&self) -> RestResult<Orders> {
        self.account().open_orders(false, None).await
    }

    /// Get export report endpoints
    pub fn exports(&self) -> ExportEndpoints<'_> {
        ExportEndpoints::new(&self.dispatcher)
    }

    // ========================================================================
    // Private Trading Endpoints
    // ========================================================================

    /// Get trading endpoints
    pub fn trading(&self) -> TradingEndpoints<'_> {
        TradingEndpoints::new(&self.dispatcher)
    }

    /// Place a new order
    pub async fn add_order(&self, order: &OrderRequest) -> RestResult<AddOrderResult> {
        self.trading().add_order(order).await
    }

    /// Cancel an order by transaction ID
    pub async fn cancel_order(&self, txid: &str) -> RestResult<CancelOrderResult> {
        self.trading().cancel_order(txid).await
    }

    /// Cancel all open orders
    pub async fn cancel_all_orders(&self) -> RestResult<CancelOrderResult> {
        self.trading().cancel_all().await
    }

    // ========================================================================
    // Private Funding and Staking Endpoints
    // ========================================================================

    /// Get funding endpoints
    pub fn funding(&self) -> FundingEndpoints<'_> {
        FundingEndpoints::new(&self.dispatcher)
    }

    /// Get staking endpoints
    pub fn staking(&self) -> StakingEndpoints<'_> {
        StakingEndpoints::new(&self.dispatcher)
    }
}

impl std::fmt::Debug for KrakenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenClient")
            .field("has_credentials", &self.has_credentials())
            .field("request_count", &self.request_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestError;
    use crate::transport::TransportError;
    use krakgov_auth::{AuthError, Credentials};

    #[test]
    fn test_client_without_credentials() {
        let client = KrakenClient::new().unwrap();
        assert!(!client.has_credentials());
        assert_eq!(client.request_count(), 0);
    }

    #[test]
    fn test_client_with_credentials() {
        let config = ClientConfig::new().with_credentials(Credentials::new("key", "c2VjcmV0"));
        let client = KrakenClient::with_config(config).unwrap();
        assert!(client.has_credentials());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = KrakenClient::with_config(ClientConfig::new().with_ceiling(1));
        assert!(matches!(result, Err(RestError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_auth_required_error() {
        let client = KrakenClient::new().unwrap();
        let result = client.get_balance().await;
        assert!(matches!(
            result,
            Err(RestError::Auth(AuthError::MissingCredentials))
        ));
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_closed_client() {
        let client = KrakenClient::new().unwrap();
        client.close();
        let result = client.get_server_time().await;
        assert!(matches!(
            result,
            Err(RestError::Transport(TransportError::Closed))
        ));
    }
}
