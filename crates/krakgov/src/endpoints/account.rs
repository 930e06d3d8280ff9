//! Private account endpoints
//!
//! These endpoints require authentication.

use std::collections::HashMap;

use tracing::instrument;

use super::{fetch_map, join_required, parse};
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::RestResult;
use crate::types::account::OpenOrdersResult;
use crate::types::{
    Balances, ClosedOrders, HistoryRange, Ledger, LedgerPage, Orders, PositionInfo, TradeBalance,
    TradeVolume, Trades, TradesHistory,
};

/// Which timestamp `closed_orders` filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseTime {
    /// Open time
    Open,
    /// Close time
    Close,
    /// Either
    #[default]
    Both,
}

impl CloseTime {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Both => "both",
        }
    }
}

fn with_range(call: ApiCall, range: HistoryRange) -> ApiCall {
    call.opt_param("start", range.start)
        .opt_param("end", range.end)
        .opt_param("ofs", range.ofs)
}

/// Private account endpoints
#[derive(Debug, Clone, Copy)]
pub struct AccountEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get account balance
    #[instrument(skip(self))]
    pub async fn balance(&self) -> RestResult<Balances> {
        let balances = fetch_map(self.dispatcher, ApiCall::private("Balance")).await?;
        Ok(Balances(balances))
    }

    /// Get trade balance (margin info)
    ///
    /// # Arguments
    /// * `asset` - Base asset for calculations (Kraken defaults to `ZUSD`)
    #[instrument(skip(self))]
    pub async fn trade_balance(&self, asset: Option<&str>) -> RestResult<TradeBalance> {
        let call = ApiCall::private("TradeBalance").opt_param("asset", asset);
        let value = self.dispatcher.execute(call).await?.into_json()?;
        if value.is_null() {
            return Ok(TradeBalance::default());
        }
        parse(value)
    }

    /// Get open orders keyed by transaction ID
    ///
    /// # Arguments
    /// * `trades` - Include trade IDs
    /// * `userref` - Filter by user reference
    #[instrument(skip(self))]
    pub async fn open_orders(&self, trades: bool, userref: Option<i32>) -> RestResult<Orders> {
        let call = ApiCall::private("OpenOrders")
            .flag("trades", trades)
            .opt_param("userref", userref);

        let value = self.dispatcher.execute(call).await?.into_json()?;
        if value.is_null() {
            return Ok(Orders::new());
        }
        Ok(parse::<OpenOrdersResult>(value)?.open)
    }

    /// Get closed orders (50 per page) and the number matching
    #[instrument(skip(self))]
    pub async fn closed_orders(
        &self,
        trades: bool,
        userref: Option<i32>,
        range: HistoryRange,
        closetime: CloseTime,
    ) -> RestResult<ClosedOrders> {
        let call = ApiCall::private("ClosedOrders")
            .flag("trades", trades)
            .opt_param("userref", userref);
        let call = with_range(call, range).param("closetime", closetime.as_str());

        let value = self.dispatcher.execute(call).await?.into_json()?;
        if value.is_null() {
            return Ok(ClosedOrders::default());
        }
        parse(value)
    }

    /// Query orders by transaction ID (up to 50)
    #[instrument(skip(self))]
    pub async fn query_orders(
        &self,
        txids: &[&str],
        trades: bool,
        userref: Option<i32>,
    ) -> RestResult<Orders> {
        let call = ApiCall::private("QueryOrders")
            .param("txid", join_required("txid", txids)?)
            .flag("trades", trades)
            .opt_param("userref", userref);

        fetch_map(self.dispatcher, call).await
    }

    /// Get trade history (50 per page) and the number matching
    ///
    /// # Arguments
    /// * `trade_type` - `all`, `any position`, `closed position`, `closing position` or `no position`
    #[instrument(skip(self))]
    pub async fn trades_history(
        &self,
        trade_type: Option<&str>,
        trades: bool,
        range: HistoryRange,
    ) -> RestResult<TradesHistory> {
        let call = ApiCall::private("TradesHistory")
            .param("type", trade_type.unwrap_or("all"))
            .flag("trades", trades);
        let call = with_range(call, range);

        let value = self.dispatcher.execute(call).await?.into_json()?;
        if value.is_null() {
            return Ok(TradesHistory::default());
        }
        parse(value)
    }

    /// Query trades by ID (up to 20)
    #[instrument(skip(self))]
    pub async fn query_trades(&self, txids: &[&str], trades: bool) -> RestResult<Trades> {
        let call = ApiCall::private("QueryTrades")
            .param("txid", join_required("txid", txids)?)
            .flag("trades", trades);

        fetch_map(self.dispatcher, call).await
    }

    /// Get open margin positions keyed by position ID
    ///
    /// # Arguments
    /// * `txids` - Restrict to these positions; all when empty
    /// * `docalcs` - Include profit/loss calculations
    #[instrument(skip(self))]
    pub async fn open_positions(
        &self,
        txids: &[&str],
        docalcs: bool,
    ) -> RestResult<HashMap<String, PositionInfo>> {
        let call = ApiCall::private("OpenPositions")
            .opt_param("txid", (!txids.is_empty()).then(|| txids.join(",")))
            .flag("docalcs", docalcs);

        fetch_map(self.dispatcher, call).await
    }

    /// Get ledger entries (50 per page) and the number matching
    ///
    /// # Arguments
    /// * `assets` - Restrict to these assets; all when empty
    /// * `aclass` - Asset class (default `currency`)
    /// * `entry_type` - `all`, `trade`, `deposit`, `withdrawal`, `transfer`, `margin`, `rollover`, `spend`, `receive`, `settled`, `adjustment`, `staking`, ...
    #[instrument(skip(self))]
    pub async fn ledgers(
        &self,
        assets: &[&str],
        aclass: Option<&str>,
        entry_type: Option<&str>,
        range: HistoryRange,
    ) -> RestResult<LedgerPage> {
        let call = ApiCall::private("Ledgers")
            .opt_param("asset", (!assets.is_empty()).then(|| assets.join(",")))
            .opt_param("aclass", aclass)
            .param("type", entry_type.unwrap_or("all"));
        let call = with_range(call, range);

        let value = self.dispatcher.execute(call).await?.into_json()?;
        if value.is_null() {
            return Ok(LedgerPage::default());
        }
        parse(value)
    }

    /// Query ledger entries by ID (up to 20)
    #[instrument(skip(self))]
    pub async fn query_ledgers(&self, ids: &[&str], trades: bool) -> RestResult<Ledger> {
        let call = ApiCall::private("QueryLedgers")
            .param("id", join_required("id", ids)?)
            .flag("trades", trades);

        fetch_map(self.dispatcher, call).await
    }

    /// Get 30-day trade volume and, for the given pairs, the applicable fees
    #[instrument(skip(self))]
    pub async fn trade_volume(&self, pairs: &[&str]) -> RestResult<TradeVolume> {
        let call = ApiCall::private("TradeVolume")
            .opt_param("pair", (!pairs.is_empty()).then(|| pairs.join(",")));

        self.dispatcher.execute_json(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_params() {
        let call = with_range(
            ApiCall::private("Ledgers"),
            HistoryRange::new().since(1_600_000_000).offset(50),
        );

        assert_eq!(
            call.params(),
            &[
                ("start".to_string(), "1600000000".to_string()),
                ("ofs".to_string(), "50".to_string()),
            ]
        );
        assert_eq!(CloseTime::default().as_str(), "both");
    }
}
