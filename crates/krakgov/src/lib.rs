//! Rate-governed REST API client for the Kraken cryptocurrency exchange
//!
//! Every call goes through a single [`Dispatcher`] that keeps Kraken's
//! call-rate counter on the client side: each call is charged its cost, the
//! counter decays by one unit per second, and an attempt is only sent while
//! the counter stays below the ceiling. Transient failures (non-2xx status,
//! connection errors) are retried after `interval * cost`, with a fresh
//! nonce each time, until they succeed or the counter refuses another
//! attempt.
//!
//! # Features
//!
//! - **Market Data**: Server time, assets, ticker, OHLC, order book, trades, spreads
//! - **Account**: Balances, orders, trades, positions, ledgers, fee volume
//! - **Exports**: Request, poll, download and delete trade and ledger reports
//! - **Trading**: Place and cancel orders, dead man's switch
//! - **Funding**: Deposits, withdrawals, wallet transfers
//! - **Staking**: Stake, unstake and list staking transactions
//!
//! # Authentication
//!
//! Private endpoints require API credentials. Requests are signed with
//! HMAC-SHA512 by [`krakgov_auth`]; an optional second factor (static
//! password or authenticator app) is sent as `otp`.
//!
//! # Example
//!
//! ```no_run
//! use krakgov::{ClientConfig, KrakenClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = KrakenClient::new()?;
//!     let ticker = client.get_ticker("XBTUSD").await?;
//!     println!("BTC/USD: {:?}", ticker);
//!
//!     // Private endpoints (auth required)
//!     let auth_client = KrakenClient::with_config(ClientConfig::from_env()?)?;
//!     let balance = auth_client.get_balance().await?;
//!     println!("Balances: {:?}", balance);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Rate Limiting
//!
//! The default ceiling of 20 matches Kraken's starter tier. Raise it with
//! [`ClientConfig::with_ceiling`] for higher verification tiers, and adjust
//! per-method costs with [`ClientConfig::with_cost`].

pub mod client;
pub mod config;
pub mod cost;
pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod error_codes;
pub mod governor;
pub mod response;
pub mod time;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::KrakenClient;
pub use config::{ClientConfig, RetryPolicy};
pub use cost::CostTable;
pub use dispatcher::{Access, ApiCall, Dispatcher};
pub use error::{RestError, RestResult};
pub use error_codes::{ErrorCategory, ExchangeError};
pub use governor::{Admission, RateGovernor};
pub use krakgov_auth::{Credentials, SecondFactor};
pub use response::{ApiResponse, Payload};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};

// Re-export endpoint-specific types
pub use types::{
    // Market data
    AssetPairInfo, Candle, Interval, OrderBook, PublicTrade, ServerTime, TickerInfo,
    // Account
    Balances, HistoryRange, LedgerEntry, OrderInfo, TradeInfo,
    // Trading
    AddOrderResult, OrderRequest, OrderSide, OrderType, TimeInForce,
};
