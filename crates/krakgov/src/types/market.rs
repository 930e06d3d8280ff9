//! Public market data types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::row::{pair_rows, Row};
use super::OrderSide;
use crate::error::{RestError, RestResult};
use crate::time::unix_to_datetime;

/// Server time
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerTime {
    /// Unix timestamp
    pub unixtime: i64,
    /// RFC 1123 formatted time
    pub rfc1123: String,
}

/// System status
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemStatus {
    /// `online`, `maintenance`, `cancel_only` or `post_only`
    pub status: String,
    /// Timestamp (RFC 3339)
    pub timestamp: String,
}

impl SystemStatus {
    /// Whether full trading is available
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Asset information
#[derive(Debug, Clone, Deserialize)]
pub struct AssetInfo {
    /// Asset class
    pub aclass: String,
    /// Alternate name
    pub altname: String,
    /// Decimal places for record keeping
    pub decimals: u32,
    /// Decimal places for display
    pub display_decimals: u32,
    /// Collateral valuation multiplier
    #[serde(default)]
    pub collateral_value: Option<Decimal>,
    /// Funding/trading status
    #[serde(default)]
    pub status: Option<String>,
}

/// Asset pair information
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPairInfo {
    /// Alternate pair name
    pub altname: String,
    /// WebSocket pair name
    #[serde(default)]
    pub wsname: Option<String>,
    /// Asset class of base
    pub aclass_base: String,
    /// Base asset
    pub base: String,
    /// Asset class of quote
    pub aclass_quote: String,
    /// Quote asset
    pub quote: String,
    /// Pair decimals
    pub pair_decimals: u32,
    /// Lot decimals
    pub lot_decimals: u32,
    /// Fee schedule `[volume, percent fee]`
    #[serde(default)]
    pub fees: Vec<(Decimal, Decimal)>,
    /// Maker fee schedule
    #[serde(default)]
    pub fees_maker: Vec<(Decimal, Decimal)>,
    /// Minimum order volume
    #[serde(default)]
    pub ordermin: Option<Decimal>,
    /// Minimum order cost
    #[serde(default)]
    pub costmin: Option<Decimal>,
    /// Price tick size
    #[serde(default)]
    pub tick_size: Option<Decimal>,
    /// Trading status
    #[serde(default)]
    pub status: Option<String>,
}

/// Ticker information for a trading pair
#[derive(Debug, Clone, Deserialize)]
pub struct TickerInfo {
    /// Ask `[price, whole lot volume, lot volume]`
    pub a: Vec<String>,
    /// Bid `[price, whole lot volume, lot volume]`
    pub b: Vec<String>,
    /// Last trade closed `[price, lot volume]`
    pub c: Vec<String>,
    /// Volume `[today, last 24 hours]`
    pub v: Vec<String>,
    /// Volume weighted average price `[today, last 24 hours]`
    pub p: Vec<String>,
    /// Number of trades `[today, last 24 hours]`
    pub t: Vec<u64>,
    /// Low `[today, last 24 hours]`
    pub l: Vec<String>,
    /// High `[today, last 24 hours]`
    pub h: Vec<String>,
    /// Today's opening price
    pub o: String,
}

impl TickerInfo {
    fn first(values: &[String]) -> Option<Decimal> {
        values.first().and_then(|s| s.parse().ok())
    }

    /// Best ask
    pub fn ask_price(&self) -> Option<Decimal> {
        Self::first(&self.a)
    }

    /// Best bid
    pub fn bid_price(&self) -> Option<Decimal> {
        Self::first(&self.b)
    }

    /// Last trade price
    pub fn last_price(&self) -> Option<Decimal> {
        Self::first(&self.c)
    }

    /// Mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.ask_price()? + self.bid_price()?) / Decimal::TWO)
    }
}

/// One OHLC candle
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// Unix time of the candle start
    pub time: i64,
    /// Open
    pub open: Decimal,
    /// High
    pub high: Decimal,
    /// Low
    pub low: Decimal,
    /// Close
    pub close: Decimal,
    /// Volume weighted average price
    pub vwap: Decimal,
    /// Volume
    pub volume: Decimal,
    /// Number of trades
    pub count: i64,
}

impl Candle {
    pub(crate) fn from_row(value: &Value) -> RestResult<Self> {
        let row = Row::new("OHLC", value)?;
        Ok(Self {
            time: row.int(0)?,
            open: row.decimal(1)?,
            high: row.decimal(2)?,
            low: row.decimal(3)?,
            close: row.decimal(4)?,
            vwap: row.decimal(5)?,
            volume: row.decimal(6)?,
            count: row.int(7)?,
        })
    }

    /// Candle start as a UTC datetime
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.time as f64)
    }
}

/// Candle interval in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    /// 1 minute
    #[default]
    Minute1,
    /// 5 minutes
    Minute5,
    /// 15 minutes
    Minute15,
    /// 30 minutes
    Minute30,
    /// 1 hour
    Hour1,
    /// 4 hours
    Hour4,
    /// 1 day
    Day1,
    /// 1 week
    Week1,
    /// 15 days
    Day15,
}

impl Interval {
    /// Length in minutes, as sent on the wire
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Minute1 => 1,
            Self::Minute5 => 5,
            Self::Minute15 => 15,
            Self::Minute30 => 30,
            Self::Hour1 => 60,
            Self::Hour4 => 240,
            Self::Day1 => 1440,
            Self::Week1 => 10080,
            Self::Day15 => 21600,
        }
    }
}

/// One price level of the order book
#[derive(Debug, Clone, PartialEq)]
pub struct BookLevel {
    /// Price
    pub price: Decimal,
    /// Volume
    pub volume: Decimal,
    /// Unix time of the last update
    pub time: i64,
}

impl BookLevel {
    pub(crate) fn from_row(value: &Value) -> RestResult<Self> {
        let row = Row::new("Depth", value)?;
        Ok(Self {
            price: row.decimal(0)?,
            volume: row.decimal(1)?,
            time: row.int(2)?,
        })
    }
}

/// Order book snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    /// Asks, best first
    pub asks: Vec<BookLevel>,
    /// Bids, best first
    pub bids: Vec<BookLevel>,
}

impl OrderBook {
    pub(crate) fn from_result(result: &Value) -> RestResult<Self> {
        if result.is_null() {
            return Ok(Self::default());
        }
        let object = super::row::as_object("Depth", result)?;
        let Some(book) = object.values().next() else {
            return Ok(Self::default());
        };

        let side = |name: &str| -> RestResult<Vec<BookLevel>> {
            match book.get(name).and_then(Value::as_array) {
                Some(rows) => rows.iter().map(BookLevel::from_row).collect(),
                None => Ok(Vec::new()),
            }
        };

        Ok(Self {
            asks: side("asks")?,
            bids: side("bids")?,
        })
    }

    /// Best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|level| level.price)
    }

    /// Best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|level| level.price)
    }

    /// Spread between best ask and best bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }
}

/// Market or limit order, as reported in public trades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    /// `m`
    Market,
    /// `l`
    Limit,
}

/// One public trade
#[derive(Debug, Clone, PartialEq)]
pub struct PublicTrade {
    /// Price
    pub price: Decimal,
    /// Volume
    pub volume: Decimal,
    /// Unix time (whole seconds)
    pub time: i64,
    /// Buy or sell
    pub side: OrderSide,
    /// Market or limit
    pub kind: TradeKind,
    /// Miscellaneous
    pub misc: String,
    /// Trade id, when Kraken sends one
    pub trade_id: Option<i64>,
}

impl PublicTrade {
    pub(crate) fn from_row(value: &Value) -> RestResult<Self> {
        let row = Row::new("Trades", value)?;

        let side = match row.text(3)? {
            "b" => OrderSide::Buy,
            "s" => OrderSide::Sell,
            other => return Err(RestError::Parse(format!("unknown trade side: {other}"))),
        };
        let kind = match row.text(4)? {
            "m" => TradeKind::Market,
            "l" => TradeKind::Limit,
            other => return Err(RestError::Parse(format!("unknown trade kind: {other}"))),
        };

        Ok(Self {
            price: row.decimal(0)?,
            volume: row.decimal(1)?,
            time: row.int(2)?,
            side,
            kind,
            misc: row.text(5)?.to_string(),
            trade_id: row.opt_int(6),
        })
    }

    /// Trade time as a UTC datetime
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.time as f64)
    }
}

/// One spread observation
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadRow {
    /// Unix time
    pub time: i64,
    /// Bid
    pub bid: Decimal,
    /// Ask
    pub ask: Decimal,
    /// `ask - bid`
    pub spread: Decimal,
}

impl SpreadRow {
    pub(crate) fn from_row(value: &Value) -> RestResult<Self> {
        let row = Row::new("Spread", value)?;
        let bid = row.decimal(1)?;
        let ask = row.decimal(2)?;
        Ok(Self {
            time: row.int(0)?,
            bid,
            ask,
            spread: ask - bid,
        })
    }
}

/// Rows plus the cursor to pass as `since` on the next poll
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    /// Rows, oldest first
    pub rows: Vec<T>,
    /// Cursor for the next request
    pub last: i64,
}

impl<T> Paged<T> {
    pub(crate) fn from_result(
        kind: &'static str,
        result: &Value,
        parse: impl Fn(&Value) -> RestResult<T>,
    ) -> RestResult<Self> {
        let (rows, last) = pair_rows(kind, result)?;
        let rows = rows.iter().map(parse).collect::<RestResult<Vec<_>>>()?;
        Ok(Self { rows, last })
    }

    /// Whether no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ticker keyed by pair name
pub type Tickers = HashMap<String, TickerInfo>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_candles() {
        let result = json!({
            "XXBTZUSD": [
                [1688671200, "30306.1", "30306.2", "30305.7", "30305.7", "30306.1", "3.39243896", 23],
                [1688671260, "30304.5", "30304.5", "30300.0", "30300.0", "30300.3", "4.42996871", 18]
            ],
            "last": 1688672160
        });

        let page = Paged::from_result("OHLC", &result, Candle::from_row).unwrap();
        assert_eq!(page.last, 1688672160);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].time, 1688671200);
        assert_eq!(page.rows[0].open, dec!(30306.1));
        assert_eq!(page.rows[1].volume, dec!(4.42996871));
        assert_eq!(page.rows[1].count, 18);
        assert!(page.rows[0].datetime().is_some());
    }

    #[test]
    fn test_empty_candles() {
        let result = json!({"XXBTZUSD": [], "last": 1688672160});
        let page = Paged::from_result("OHLC", &result, Candle::from_row).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_order_book() {
        let result = json!({
            "XXBTZUSD": {
                "asks": [["30384.10000", "2.059", 1688671659], ["30387.90000", "1.500", 1688671380]],
                "bids": [["30297.00000", "0.115", 1688671701]]
            }
        });

        let book = OrderBook::from_result(&result).unwrap();
        assert_eq!(book.asks.len(), 2);
        assert_eq!(book.bids[0].time, 1688671701);
        assert_eq!(book.best_ask(), Some(dec!(30384.1)));
        assert_eq!(book.spread(), Some(dec!(87.1)));
    }

    #[test]
    fn test_public_trades() {
        let result = json!({
            "XXBTZUSD": [
                ["30243.40000", "0.34507674", 1688669597.8277369, "b", "m", "", 61044952],
                ["30243.30000", "0.00376960", 1688669598.2804112, "s", "l", ""]
            ],
            "last": "1688671969993150842"
        });

        let page = Paged::from_result("Trades", &result, PublicTrade::from_row).unwrap();
        assert_eq!(page.last, 1688671969993150842);
        assert_eq!(page.rows[0].side, OrderSide::Buy);
        assert_eq!(page.rows[0].kind, TradeKind::Market);
        assert_eq!(page.rows[0].time, 1688669597);
        assert_eq!(page.rows[0].trade_id, Some(61044952));
        assert_eq!(page.rows[1].side, OrderSide::Sell);
        assert_eq!(page.rows[1].trade_id, None);
    }

    #[test]
    fn test_spreads_compute_difference() {
        let result = json!({
            "XXBTZUSD": [[1688671834, "30292.10000", "30297.50000"]],
            "last": 1688672106
        });

        let page = Paged::from_result("Spread", &result, SpreadRow::from_row).unwrap();
        assert_eq!(page.rows[0].spread, dec!(5.4));
        assert_eq!(page.last, 1688672106);
    }

    #[test]
    fn test_interval_minutes() {
        assert_eq!(Interval::default().minutes(), 1);
        assert_eq!(Interval::Day1.minutes(), 1440);
    }
}
