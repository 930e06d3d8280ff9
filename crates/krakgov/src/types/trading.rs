//! Order placement and cancellation types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    /// Market order
    Market,
    /// Limit order (`price` = limit price)
    Limit,
    /// Stop loss (`price` = stop price)
    StopLoss,
    /// Take profit (`price` = take profit price)
    TakeProfit,
    /// Stop loss limit (`price` = trigger, `price2` = limit)
    StopLossLimit,
    /// Take profit limit (`price` = trigger, `price2` = limit)
    TakeProfitLimit,
    /// Trailing stop (`price` = offset)
    TrailingStop,
    /// Trailing stop limit (`price` = offset, `price2` = limit offset)
    TrailingStopLimit,
    /// Settle position
    SettlePosition,
}

impl OrderType {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::StopLoss => "stop-loss",
            Self::TakeProfit => "take-profit",
            Self::StopLossLimit => "stop-loss-limit",
            Self::TakeProfitLimit => "take-profit-limit",
            Self::TrailingStop => "trailing-stop",
            Self::TrailingStopLimit => "trailing-stop-limit",
            Self::SettlePosition => "settle-position",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time in force for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[serde(rename = "GTC")]
    GoodTillCancelled,
    /// Immediate or cancel
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Good till date (requires `expiretm`)
    #[serde(rename = "GTD")]
    GoodTillDate,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoodTillCancelled => write!(f, "GTC"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
            Self::GoodTillDate => write!(f, "GTD"),
        }
    }
}

/// Order flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFlag {
    /// Post-only order (limit orders only)
    PostOnly,
    /// Prefer fee in base currency
    FeeInBase,
    /// Prefer fee in quote currency
    FeeInQuote,
    /// Disable market price protection
    NoMarketPriceProtection,
    /// Volume in quote currency (not for leveraged orders)
    VolumeInQuote,
}

impl OrderFlag {
    /// Get the API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostOnly => "post",
            Self::FeeInBase => "fcib",
            Self::FeeInQuote => "fciq",
            Self::NoMarketPriceProtection => "nompp",
            Self::VolumeInQuote => "viqc",
        }
    }
}

/// Scheduled start or expiry of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTime {
    /// Unix timestamp
    At(i64),
    /// Seconds from now
    In(u64),
}

impl std::fmt::Display for OrderTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(unix) => write!(f, "{unix}"),
            Self::In(seconds) => write!(f, "+{seconds}"),
        }
    }
}

/// Conditional close attached to an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOrder {
    /// Close order type
    pub order_type: OrderType,
    /// Close price
    pub price: Decimal,
    /// Secondary close price
    pub price2: Option<Decimal>,
}

/// Request to place an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Trading pair
    pub pair: String,
    /// Order side
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Order volume in lots
    pub volume: Decimal,
    /// Price (meaning depends on the order type)
    pub price: Option<Decimal>,
    /// Secondary price
    pub price2: Option<Decimal>,
    /// Time in force
    pub time_in_force: Option<TimeInForce>,
    /// Leverage (for margin)
    pub leverage: Option<String>,
    /// Order flags
    pub flags: Vec<OrderFlag>,
    /// Scheduled start
    pub start: Option<OrderTime>,
    /// Expiry
    pub expire: Option<OrderTime>,
    /// User reference ID
    pub userref: Option<i32>,
    /// Validate only (don't submit)
    pub validate: bool,
    /// Conditional close
    pub close: Option<CloseOrder>,
    /// Trading agreement acknowledgement, required for some jurisdictions
    pub trading_agreement: Option<String>,
}

impl OrderRequest {
    /// Create an order of any type
    pub fn new(pair: impl Into<String>, side: OrderSide, order_type: OrderType, volume: Decimal) -> Self {
        Self {
            pair: pair.into(),
            side,
            order_type,
            volume,
            price: None,
            price2: None,
            time_in_force: None,
            leverage: None,
            flags: Vec::new(),
            start: None,
            expire: None,
            userref: None,
            validate: false,
            close: None,
            trading_agreement: None,
        }
    }

    /// Create a market order
    pub fn market(pair: impl Into<String>, side: OrderSide, volume: Decimal) -> Self {
        Self::new(pair, side, OrderType::Market, volume)
    }

    /// Create a limit order
    pub fn limit(pair: impl Into<String>, side: OrderSide, volume: Decimal, price: Decimal) -> Self {
        Self::new(pair, side, OrderType::Limit, volume).with_price(price)
    }

    /// Create a stop loss order
    pub fn stop_loss(pair: impl Into<String>, side: OrderSide, volume: Decimal, stop_price: Decimal) -> Self {
        Self::new(pair, side, OrderType::StopLoss, volume).with_price(stop_price)
    }

    /// Set the primary price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the secondary price
    pub fn with_price2(mut self, price2: Decimal) -> Self {
        self.price2 = Some(price2);
        self
    }

    /// Set time in force
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Add an order flag
    pub fn with_flag(mut self, flag: OrderFlag) -> Self {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self
    }

    /// Set as post-only (maker only)
    pub fn post_only(self) -> Self {
        self.with_flag(OrderFlag::PostOnly)
    }

    /// Set leverage for margin trading
    pub fn with_leverage(mut self, leverage: impl Into<String>) -> Self {
        self.leverage = Some(leverage.into());
        self
    }

    /// Schedule the start
    pub fn starting(mut self, start: OrderTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the expiry
    pub fn expiring(mut self, expire: OrderTime) -> Self {
        self.expire = Some(expire);
        self
    }

    /// Set user reference ID
    pub fn with_userref(mut self, userref: i32) -> Self {
        self.userref = Some(userref);
        self
    }

    /// Set as validate-only (don't actually submit)
    pub fn validate_only(mut self) -> Self {
        self.validate = true;
        self
    }

    /// Add a close order
    pub fn with_close(mut self, order_type: OrderType, price: Decimal) -> Self {
        self.close = Some(CloseOrder {
            order_type,
            price,
            price2: None,
        });
        self
    }

    /// Acknowledge the trading agreement (`agree`)
    pub fn with_trading_agreement(mut self) -> Self {
        self.trading_agreement = Some("agree".to_string());
        self
    }

    /// Form fields in the order Kraken documents them
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("pair".to_string(), self.pair.clone()),
            ("type".to_string(), self.side.to_string()),
            ("ordertype".to_string(), self.order_type.to_string()),
            ("volume".to_string(), self.volume.to_string()),
        ];
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.to_string(), value));
            }
        };

        push("price", self.price.map(|p| p.to_string()));
        push("price2", self.price2.map(|p| p.to_string()));
        push("leverage", self.leverage.clone());
        push("timeinforce", self.time_in_force.map(|t| t.to_string()));
        if !self.flags.is_empty() {
            let flags: Vec<&str> = self.flags.iter().map(OrderFlag::as_str).collect();
            push("oflags", Some(flags.join(",")));
        }
        push("starttm", self.start.map(|t| t.to_string()));
        push("expiretm", self.expire.map(|t| t.to_string()));
        push("userref", self.userref.map(|u| u.to_string()));
        push("validate", self.validate.then(|| "true".to_string()));
        if let Some(close) = &self.close {
            push("close[ordertype]", Some(close.order_type.to_string()));
            push("close[price]", Some(close.price.to_string()));
            push("close[price2]", close.price2.map(|p| p.to_string()));
        }
        push("trading_agreement", self.trading_agreement.clone());

        params
    }
}

/// Response from placing an order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddOrderResult {
    /// Order description
    pub descr: AddOrderDescription,
    /// Transaction IDs; empty when only validating
    #[serde(default)]
    pub txid: Vec<String>,
}

/// Order response description
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddOrderDescription {
    /// Order description
    pub order: String,
    /// Close order description (if applicable)
    #[serde(default)]
    pub close: Option<String>,
}

/// Cancel order result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CancelOrderResult {
    /// Number of orders cancelled
    pub count: u32,
    /// Whether cancel is pending
    #[serde(default)]
    pub pending: Option<bool>,
}

/// Dead man's switch state
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelAllAfter {
    /// When the request was received
    #[serde(rename = "currentTime")]
    pub current_time: String,
    /// When all orders will be cancelled unless the timer is extended;
    /// `1970-01-01T00:00:00Z` once disabled
    #[serde(rename = "triggerTime", alias = "triggertime")]
    pub trigger_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_order_request_builder() {
        let order = OrderRequest::limit("XBTUSD", OrderSide::Buy, Decimal::ONE, Decimal::from(50000))
            .post_only()
            .post_only()
            .with_userref(123)
            .with_time_in_force(TimeInForce::GoodTillCancelled);

        assert_eq!(order.pair, "XBTUSD");
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.price, Some(Decimal::from(50000)));
        assert_eq!(order.flags, vec![OrderFlag::PostOnly]);
        assert_eq!(order.userref, Some(123));
    }

    #[test]
    fn test_limit_order_params() {
        let params = OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(1.25), dec!(37500))
            .with_flag(OrderFlag::FeeInQuote)
            .post_only()
            .validate_only()
            .to_params();

        assert_eq!(&params[0], &("pair".to_string(), "XBTUSD".to_string()));
        assert_eq!(value(&params, "type"), Some("buy"));
        assert_eq!(value(&params, "ordertype"), Some("limit"));
        assert_eq!(value(&params, "volume"), Some("1.25"));
        assert_eq!(value(&params, "price"), Some("37500"));
        assert_eq!(value(&params, "oflags"), Some("fciq,post"));
        assert_eq!(value(&params, "validate"), Some("true"));
        assert_eq!(value(&params, "price2"), None);
    }

    #[test]
    fn test_market_order_omits_optional_fields() {
        let params = OrderRequest::market("ETHUSD", OrderSide::Sell, dec!(0.5)).to_params();
        assert_eq!(params.len(), 4);
        assert_eq!(value(&params, "validate"), None);
    }

    #[test]
    fn test_close_and_schedule_params() {
        let params = OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(1), dec!(30000))
            .with_close(OrderType::StopLoss, dec!(29000))
            .starting(OrderTime::In(60))
            .expiring(OrderTime::At(1_700_000_000))
            .with_trading_agreement()
            .to_params();

        assert_eq!(value(&params, "close[ordertype]"), Some("stop-loss"));
        assert_eq!(value(&params, "close[price]"), Some("29000"));
        assert_eq!(value(&params, "starttm"), Some("+60"));
        assert_eq!(value(&params, "expiretm"), Some("1700000000"));
        assert_eq!(value(&params, "trading_agreement"), Some("agree"));
    }

    #[test]
    fn test_cancel_all_after() {
        let json = r#"{"currentTime":"2023-03-24T17:41:56Z","triggerTime":"2023-03-24T17:42:56Z"}"#;
        let result: CancelAllAfter = serde_json::from_str(json).unwrap();
        assert_eq!(result.trigger_time, "2023-03-24T17:42:56Z");
    }
}
