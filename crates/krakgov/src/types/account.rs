//! Private account types: balances, orders, trades, ledgers, exports

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::time::unix_to_datetime;

/// Account balance per asset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Balances(pub HashMap<String, Decimal>);

impl Balances {
    /// Balance of one asset
    pub fn get(&self, asset: &str) -> Option<Decimal> {
        self.0.get(asset).copied()
    }

    /// All non-zero balances
    pub fn non_zero(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter().filter(|(_, balance)| !balance.is_zero())
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the account holds no assets
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Trade balance (margin summary) in one reference asset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TradeBalance {
    /// Equivalent balance (combined balance of all currencies)
    #[serde(default)]
    pub eb: Option<Decimal>,
    /// Trade balance (combined balance of all equity currencies)
    #[serde(default)]
    pub tb: Option<Decimal>,
    /// Margin amount of open positions
    #[serde(default)]
    pub m: Option<Decimal>,
    /// Unrealized net profit/loss of open positions
    #[serde(default)]
    pub n: Option<Decimal>,
    /// Cost basis of open positions
    #[serde(default)]
    pub c: Option<Decimal>,
    /// Current floating valuation of open positions
    #[serde(default)]
    pub v: Option<Decimal>,
    /// Equity: trade balance + unrealized net profit/loss
    #[serde(default)]
    pub e: Option<Decimal>,
    /// Free margin: equity - initial margin
    #[serde(default)]
    pub mf: Option<Decimal>,
    /// Margin level: (equity / initial margin) * 100
    #[serde(default)]
    pub ml: Option<Decimal>,
    /// Unexecuted value
    #[serde(default)]
    pub uv: Option<Decimal>,
}

/// Order description
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrderDescription {
    /// Asset pair
    pub pair: String,
    /// Type (buy/sell)
    #[serde(rename = "type")]
    pub side: String,
    /// Order type
    pub ordertype: String,
    /// Primary price
    pub price: String,
    /// Secondary price
    pub price2: String,
    /// Leverage
    pub leverage: String,
    /// Order description
    pub order: String,
    /// Close order description
    pub close: String,
}

/// Open, closed or queried order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderInfo {
    /// Referral order transaction ID that created this order
    #[serde(default)]
    pub refid: Option<String>,
    /// User reference ID
    #[serde(default)]
    pub userref: Option<i64>,
    /// `pending`, `open`, `closed`, `canceled` or `expired`
    pub status: String,
    /// Open timestamp
    pub opentm: f64,
    /// Close timestamp
    #[serde(default)]
    pub closetm: Option<f64>,
    /// Start timestamp
    #[serde(default)]
    pub starttm: Option<f64>,
    /// Expire timestamp
    #[serde(default)]
    pub expiretm: Option<f64>,
    /// Order description
    pub descr: OrderDescription,
    /// Volume
    pub vol: Decimal,
    /// Executed volume
    pub vol_exec: Decimal,
    /// Cost
    pub cost: Decimal,
    /// Fee
    pub fee: Decimal,
    /// Average price
    pub price: Decimal,
    /// Stop price
    #[serde(default)]
    pub stopprice: Option<Decimal>,
    /// Triggered limit price
    #[serde(default)]
    pub limitprice: Option<Decimal>,
    /// Miscellaneous
    #[serde(default)]
    pub misc: String,
    /// Order flags
    #[serde(default)]
    pub oflags: String,
    /// Closing reason
    #[serde(default)]
    pub reason: Option<String>,
    /// Trade IDs, when requested with `trades`
    #[serde(default)]
    pub trades: Vec<String>,
}

impl OrderInfo {
    /// Open time as a UTC datetime
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.opentm)
    }
}

/// Orders keyed by transaction ID
pub type Orders = HashMap<String, OrderInfo>;

#[derive(Debug, Deserialize)]
pub(crate) struct OpenOrdersResult {
    #[serde(default)]
    pub open: Orders,
}

/// One page of closed orders
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClosedOrders {
    /// Orders keyed by transaction ID
    #[serde(default)]
    pub closed: Orders,
    /// Number of orders matching the criteria
    #[serde(default)]
    pub count: u64,
}

/// Own trade
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeInfo {
    /// Order transaction ID
    pub ordertxid: String,
    /// Position transaction ID
    #[serde(default)]
    pub postxid: Option<String>,
    /// Pair
    pub pair: String,
    /// Time of trade
    pub time: f64,
    /// Type (buy/sell)
    #[serde(rename = "type")]
    pub side: String,
    /// Order type
    pub ordertype: String,
    /// Average price
    pub price: Decimal,
    /// Total cost
    pub cost: Decimal,
    /// Fee
    pub fee: Decimal,
    /// Volume
    pub vol: Decimal,
    /// Initial margin
    #[serde(default)]
    pub margin: Option<Decimal>,
    /// Miscellaneous
    #[serde(default)]
    pub misc: String,
    /// Position status, for position trades
    #[serde(default)]
    pub posstatus: Option<String>,
}

impl TradeInfo {
    /// Trade time as a UTC datetime
    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.time)
    }
}

/// Trades keyed by trade ID
pub type Trades = HashMap<String, TradeInfo>;

/// One page of trade history
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TradesHistory {
    /// Trades keyed by trade ID
    #[serde(default)]
    pub trades: Trades,
    /// Number of trades matching the criteria
    #[serde(default)]
    pub count: u64,
}

/// Open margin position
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionInfo {
    /// Order ID responsible for the position
    pub ordertxid: String,
    /// Position status
    #[serde(default)]
    pub posstatus: Option<String>,
    /// Pair
    pub pair: String,
    /// Open time
    pub time: f64,
    /// Direction (buy/sell)
    #[serde(rename = "type")]
    pub side: String,
    /// Order type used to open the position
    pub ordertype: String,
    /// Opening cost
    pub cost: Decimal,
    /// Opening fee
    pub fee: Decimal,
    /// Position volume
    pub vol: Decimal,
    /// Closed volume
    pub vol_closed: Decimal,
    /// Initial margin
    pub margin: Decimal,
    /// Current value, when requested with `docalcs`
    #[serde(default)]
    pub value: Option<Decimal>,
    /// Unrealized profit/loss, when requested with `docalcs`
    #[serde(default)]
    pub net: Option<Decimal>,
    /// Funding cost and term
    #[serde(default)]
    pub terms: Option<String>,
    /// Next rollover time
    #[serde(default)]
    pub rollovertm: Option<String>,
    /// Miscellaneous
    #[serde(default)]
    pub misc: String,
    /// Order flags
    #[serde(default)]
    pub oflags: String,
}

/// Ledger entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerEntry {
    /// Reference ID
    pub refid: String,
    /// Time
    pub time: f64,
    /// Entry type (trade, deposit, withdrawal, staking, ...)
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Entry subtype
    #[serde(default)]
    pub subtype: String,
    /// Asset class
    pub aclass: String,
    /// Asset
    pub asset: String,
    /// Amount
    pub amount: Decimal,
    /// Fee
    pub fee: Decimal,
    /// Resulting balance
    pub balance: Decimal,
}

impl LedgerEntry {
    /// Entry time as a UTC datetime
    pub fn booked_at(&self) -> Option<DateTime<Utc>> {
        unix_to_datetime(self.time)
    }
}

/// Ledger entries keyed by ledger ID
pub type Ledger = HashMap<String, LedgerEntry>;

/// One page of ledger entries
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LedgerPage {
    /// Entries keyed by ledger ID
    #[serde(default)]
    pub ledger: Ledger,
    /// Number of entries matching the criteria
    #[serde(default)]
    pub count: u64,
}

/// One tier of a fee schedule
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeeInfo {
    /// Current fee (percent)
    pub fee: Decimal,
    /// Minimum fee
    #[serde(default)]
    pub minfee: Option<Decimal>,
    /// Maximum fee
    #[serde(default)]
    pub maxfee: Option<Decimal>,
    /// Next tier's fee
    #[serde(default)]
    pub nextfee: Option<Decimal>,
    /// Volume needed for the next tier
    #[serde(default)]
    pub nextvolume: Option<Decimal>,
    /// Volume of the current tier
    #[serde(default)]
    pub tiervolume: Option<Decimal>,
}

/// 30-day trade volume and applicable fees
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeVolume {
    /// Volume currency
    pub currency: String,
    /// Current discount volume
    pub volume: Decimal,
    /// Taker fees keyed by pair
    #[serde(default)]
    pub fees: Option<HashMap<String, FeeInfo>>,
    /// Maker fees keyed by pair (maker/taker schedules only)
    #[serde(default)]
    pub fees_maker: Option<HashMap<String, FeeInfo>>,
}

/// Time window and offset for paginated history queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryRange {
    /// Starting unix timestamp or ID (exclusive)
    pub start: Option<i64>,
    /// Ending unix timestamp or ID (inclusive)
    pub end: Option<i64>,
    /// Result offset for pagination
    pub ofs: Option<u32>,
}

impl HistoryRange {
    /// Everything Kraken returns by default (the most recent 50 entries)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start
    pub fn since(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the end
    pub fn until(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the offset
    pub fn offset(mut self, ofs: u32) -> Self {
        self.ofs = Some(ofs);
        self
    }
}

/// Export report kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Trade history
    Trades,
    /// Ledger entries
    Ledgers,
}

impl ReportKind {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trades => "trades",
            Self::Ledgers => "ledgers",
        }
    }
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Comma separated
    #[default]
    Csv,
    /// Tab separated
    Tsv,
}

impl ReportFormat {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Tsv => "TSV",
        }
    }
}

/// Request for an export report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Report kind
    pub report: ReportKind,
    /// Free-form description
    pub description: String,
    /// File format
    pub format: ReportFormat,
    /// Comma-delimited list of fields; all fields when unset
    pub fields: Option<String>,
    /// Comma-delimited list of assets (ledgers only)
    pub asset: Option<String>,
    /// Report start (unix time)
    pub starttm: Option<i64>,
    /// Report end (unix time)
    pub endtm: Option<i64>,
}

impl ExportRequest {
    /// Report with all fields in CSV
    pub fn new(report: ReportKind, description: impl Into<String>) -> Self {
        Self {
            report,
            description: description.into(),
            format: ReportFormat::Csv,
            fields: None,
            asset: None,
            starttm: None,
            endtm: None,
        }
    }

    /// Set the file format
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Restrict the fields
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Restrict the assets
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    /// Restrict the time range
    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.starttm = Some(start);
        self.endtm = Some(end);
        self
    }
}

/// Status of an export report
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportReport {
    /// Report ID
    pub id: String,
    /// Description
    pub descr: String,
    /// File format
    pub format: String,
    /// Report kind
    pub report: String,
    /// Subtype
    pub subtype: Option<String>,
    /// `Queued`, `Processing` or `Processed`
    pub status: String,
    /// Fields included
    pub fields: Option<String>,
    /// Creation time
    pub createdtm: Option<String>,
    /// Processing start time
    pub starttm: Option<String>,
    /// Completion time
    pub completedtm: Option<String>,
    /// Data start time
    pub datastarttm: Option<String>,
    /// Data end time
    pub dataendtm: Option<String>,
    /// Asset class
    pub aclass: Option<String>,
    /// Asset
    pub asset: Option<String>,
}

impl ExportReport {
    /// Whether the report can be retrieved
    pub fn is_processed(&self) -> bool {
        self.status == "Processed"
    }
}

/// How to remove an export report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveKind {
    /// Cancel a queued or processing report
    Cancel,
    /// Delete a processed report
    Delete,
}

impl RemoveKind {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Delete => "delete",
        }
    }
}

/// Result of removing an export report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoveExportResult {
    /// Whether the report was deleted
    pub delete: bool,
    /// Whether the report was cancelled
    pub cancel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balances_from_strings() {
        let balances: Balances =
            serde_json::from_str(r#"{"ZUSD":"171288.6158","XXBT":"0.0000000000","ZEUR":"504861.8946"}"#)
                .unwrap();

        assert_eq!(balances.get("ZUSD"), Some(dec!(171288.6158)));
        assert_eq!(balances.non_zero().count(), 2);
        assert_eq!(balances.len(), 3);
    }

    #[test]
    fn test_closed_orders_page() {
        let json = r#"{
            "closed": {
                "O37652-RJWRT-IMO74O": {
                    "refid": null,
                    "userref": 1,
                    "status": "canceled",
                    "reason": "User requested",
                    "opentm": 1688148493.7708,
                    "closetm": 1688148610.0482,
                    "starttm": 0,
                    "expiretm": 0,
                    "descr": {
                        "pair": "XBTGBP",
                        "type": "buy",
                        "ordertype": "stop-loss-limit",
                        "price": "23667.0",
                        "price2": "0",
                        "leverage": "none",
                        "order": "buy 0.00100000 XBTGBP @ limit 23667.0",
                        "close": ""
                    },
                    "vol": "0.00100000",
                    "vol_exec": "0.00000000",
                    "cost": "0.00000",
                    "fee": "0.00000",
                    "price": "0.00000",
                    "stopprice": "0.00000",
                    "limitprice": "0.00000",
                    "misc": "",
                    "oflags": "fciq"
                }
            },
            "count": 1
        }"#;

        let page: ClosedOrders = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 1);
        let order = &page.closed["O37652-RJWRT-IMO74O"];
        assert_eq!(order.status, "canceled");
        assert_eq!(order.descr.side, "buy");
        assert_eq!(order.vol, dec!(0.001));
        assert!(order.trades.is_empty());
        assert!(order.opened_at().is_some());
    }

    #[test]
    fn test_empty_pages() {
        let page: TradesHistory = serde_json::from_str(r#"{"trades":{},"count":0}"#).unwrap();
        assert!(page.trades.is_empty());

        let page: LedgerPage = serde_json::from_str("{}").unwrap();
        assert_eq!(page.count, 0);
    }

    #[test]
    fn test_trade_volume() {
        let json = r#"{
            "currency": "ZUSD",
            "volume": "200709587.4223",
            "fees": {
                "XXBTZUSD": {
                    "fee": "0.1000",
                    "minfee": "0.1000",
                    "maxfee": "0.2600",
                    "nextfee": null,
                    "nextvolume": null,
                    "tiervolume": "10000000.0000"
                }
            }
        }"#;

        let volume: TradeVolume = serde_json::from_str(json).unwrap();
        assert_eq!(volume.currency, "ZUSD");
        let fees = volume.fees.unwrap();
        assert_eq!(fees["XXBTZUSD"].fee, dec!(0.1));
        assert_eq!(fees["XXBTZUSD"].nextfee, None);
        assert!(volume.fees_maker.is_none());
    }

    #[test]
    fn test_export_request_builder() {
        let request = ExportRequest::new(ReportKind::Ledgers, "my ledgers")
            .with_format(ReportFormat::Tsv)
            .with_asset("XBT,ETH")
            .with_range(1_600_000_000, 1_700_000_000);

        assert_eq!(request.report.as_str(), "ledgers");
        assert_eq!(request.format.as_str(), "TSV");
        assert_eq!(request.fields, None);
        assert_eq!(request.endtm, Some(1_700_000_000));
    }
}
