//! Types for Kraken REST API requests and responses
//!
//! Kraken returns tables either as maps keyed by an ID (orders, trades,
//! ledger entries) or as positional arrays (candles, book levels, public
//! trades, spreads). Keyed tables deserialize straight into `HashMap`s;
//! positional arrays are converted row by row into named structs. Money is
//! always [`Decimal`](rust_decimal::Decimal).

pub mod account;
pub mod funding;
pub mod market;
pub(crate) mod row;
pub mod trading;

pub use account::{
    Balances, ClosedOrders, ExportReport, ExportRequest, FeeInfo, HistoryRange, Ledger, LedgerEntry, LedgerPage,
    OrderDescription, OrderInfo, Orders, PositionInfo, RemoveExportResult, RemoveKind,
    ReportFormat, ReportKind, TradeBalance, TradeInfo, TradeVolume, Trades, TradesHistory,
};
pub use funding::{
    DepositAddress, DepositMethod, StakeableAsset, StakingTransaction, TransferStatus,
    WithdrawalInfo,
};
pub use market::{
    AssetInfo, AssetPairInfo, BookLevel, Candle, Interval, OrderBook, Paged, PublicTrade,
    ServerTime, SpreadRow, SystemStatus, TickerInfo, Tickers, TradeKind,
};
pub use trading::{
    AddOrderDescription, AddOrderResult, CancelAllAfter, CancelOrderResult, CloseOrder, OrderFlag,
    OrderRequest, OrderSide, OrderTime, OrderType, TimeInForce,
};
