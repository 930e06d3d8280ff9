//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use std::collections::HashMap;

use tracing::instrument;

use super::{fetch_map, join_required, require};
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::RestResult;
use crate::types::{
    AssetInfo, AssetPairInfo, Candle, Interval, OrderBook, Paged, PublicTrade, ServerTime,
    SpreadRow, SystemStatus, Tickers,
};

/// Default order book depth
pub const DEFAULT_BOOK_DEPTH: u16 = 100;

/// Public market data endpoints
#[derive(Debug, Clone, Copy)]
pub struct MarketEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get server time
    #[instrument(skip(self))]
    pub async fn server_time(&self) -> RestResult<ServerTime> {
        self.dispatcher.execute_json(ApiCall::public("Time")).await
    }

    /// Get system status
    #[instrument(skip(self))]
    pub async fn system_status(&self) -> RestResult<SystemStatus> {
        self.dispatcher.execute_json(ApiCall::public("SystemStatus")).await
    }

    /// Get asset info
    ///
    /// # Arguments
    /// * `assets` - Assets to get info for (e.g., `["XBT", "ETH"]`); all when empty
    /// * `aclass` - Asset class (default `currency`)
    #[instrument(skip(self))]
    pub async fn assets(
        &self,
        assets: &[&str],
        aclass: Option<&str>,
    ) -> RestResult<HashMap<String, AssetInfo>> {
        let call = ApiCall::public("Assets")
            .opt_param("asset", (!assets.is_empty()).then(|| assets.join(",")))
            .opt_param("aclass", aclass);

        fetch_map(self.dispatcher, call).await
    }

    /// Get tradable asset pairs
    ///
    /// # Arguments
    /// * `pairs` - Pairs to get info for (e.g., `["XBTUSD", "ETHUSD"]`); all when empty
    #[instrument(skip(self))]
    pub async fn asset_pairs(&self, pairs: &[&str]) -> RestResult<HashMap<String, AssetPairInfo>> {
        let call = ApiCall::public("AssetPairs")
            .opt_param("pair", (!pairs.is_empty()).then(|| pairs.join(",")));

        fetch_map(self.dispatcher, call).await
    }

    /// Get ticker information for one or more pairs
    #[instrument(skip(self))]
    pub async fn ticker(&self, pairs: &[&str]) -> RestResult<Tickers> {
        let call = ApiCall::public("Ticker").param("pair", join_required("pair", pairs)?);
        fetch_map(self.dispatcher, call).await
    }

    /// Get OHLC candles
    ///
    /// The last candle is the current, not-yet-committed frame and is always
    /// present regardless of `since`.
    ///
    /// # Arguments
    /// * `pair` - Trading pair (e.g., "XBTUSD")
    /// * `interval` - Candle length
    /// * `since` - Return candles after this cursor (from a previous [`Paged::last`])
    #[instrument(skip(self))]
    pub async fn ohlc(
        &self,
        pair: &str,
        interval: Interval,
        since: Option<i64>,
    ) -> RestResult<Paged<Candle>> {
        require("pair", pair)?;
        let call = ApiCall::public("OHLC")
            .param("pair", pair)
            .param("interval", interval.minutes())
            .opt_param("since", since);

        let result = self.dispatcher.execute(call).await?.into_json()?;
        Paged::from_result("OHLC", &result, Candle::from_row)
    }

    /// Get order book depth
    ///
    /// # Arguments
    /// * `pair` - Trading pair (e.g., "XBTUSD")
    /// * `count` - Maximum number of asks/bids (1-500, default 100)
    #[instrument(skip(self))]
    pub async fn order_book(&self, pair: &str, count: Option<u16>) -> RestResult<OrderBook> {
        require("pair", pair)?;
        let count = count.unwrap_or(DEFAULT_BOOK_DEPTH).clamp(1, 500);
        let call = ApiCall::public("Depth").param("pair", pair).param("count", count);

        let result = self.dispatcher.execute(call).await?.into_json()?;
        OrderBook::from_result(&result)
    }

    /// Get recent trades (up to 1000)
    ///
    /// # Arguments
    /// * `pair` - Trading pair
    /// * `since` - Return trades after this cursor (exclusive)
    #[instrument(skip(self))]
    pub async fn recent_trades(&self, pair: &str, since: Option<i64>) -> RestResult<Paged<PublicTrade>> {
        require("pair", pair)?;
        let call = ApiCall::public("Trades").param("pair", pair).opt_param("since", since);

        let result = self.dispatcher.execute(call).await?.into_json()?;
        Paged::from_result("Trades", &result, PublicTrade::from_row)
    }

    /// Get recent spreads, with `ask - bid` computed per row
    #[instrument(skip(self))]
    pub async fn recent_spreads(&self, pair: &str, since: Option<i64>) -> RestResult<Paged<SpreadRow>> {
        require("pair", pair)?;
        let call = ApiCall::public("Spread").param("pair", pair).opt_param("since", since);

        let result = self.dispatcher.execute(call).await?.into_json()?;
        Paged::from_result("Spread", &result, SpreadRow::from_row)
    }
}
