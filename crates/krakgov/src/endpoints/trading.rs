//! Trading endpoints for order management
//!
//! These endpoints require authentication.

use tracing::{info, instrument, warn};

use super::require;
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::{RestError, RestResult};
use crate::types::{AddOrderResult, CancelAllAfter, CancelOrderResult, OrderRequest, OrderType};

/// Trading endpoints for order management
#[derive(Debug, Clone, Copy)]
pub struct TradingEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> TradingEndpoints<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Place a new order
    ///
    /// Set [`OrderRequest::validate_only`] to have Kraken check the order
    /// without submitting it.
    #[instrument(skip(self, order), fields(pair = %order.pair, side = %order.side, order_type = %order.order_type))]
    pub async fn add_order(&self, order: &OrderRequest) -> RestResult<AddOrderResult> {
        validate_order(order)?;

        let call = order
            .to_params()
            .into_iter()
            .fold(ApiCall::private("AddOrder"), |call, (key, value)| call.param(key, value));

        let result: AddOrderResult = self.dispatcher.execute_json(call).await?;

        if order.validate {
            info!(order = %result.descr.order, "Order validated");
        } else {
            info!(order = %result.descr.order, txid = ?result.txid, "Order placed");
        }
        Ok(result)
    }

    /// Cancel an open order by transaction ID or user reference
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, txid: &str) -> RestResult<CancelOrderResult> {
        require("txid", txid)?;
        let call = ApiCall::private("CancelOrder").param("txid", txid);
        self.dispatcher.execute_json(call).await
    }

    /// Cancel all open orders
    #[instrument(skip(self))]
    pub async fn cancel_all(&self) -> RestResult<CancelOrderResult> {
        let result: CancelOrderResult = self.dispatcher.execute_json(ApiCall::private("CancelAll")).await?;
        warn!(count = result.count, "Cancelled all open orders");
        Ok(result)
    }

    /// Dead man's switch: cancel all orders after `timeout_secs` unless
    /// called again; `0` disables the timer
    #[instrument(skip(self))]
    pub async fn cancel_all_after(&self, timeout_secs: u64) -> RestResult<CancelAllAfter> {
        let call = ApiCall::private("CancelAllOrdersAfter").param("timeout", timeout_secs);
        self.dispatcher.execute_json(call).await
    }
}

fn validate_order(order: &OrderRequest) -> RestResult<()> {
    require("pair", &order.pair)?;

    if order.volume.is_sign_negative() {
        return Err(RestError::InvalidParameter("volume must not be negative".to_string()));
    }

    let needs_price = !matches!(order.order_type, OrderType::Market | OrderType::SettlePosition);
    if needs_price && order.price.is_none() {
        return Err(RestError::InvalidParameter(format!(
            "{} orders need a price",
            order.order_type
        )));
    }

    let needs_price2 = matches!(
        order.order_type,
        OrderType::StopLossLimit | OrderType::TakeProfitLimit | OrderType::TrailingStopLimit
    );
    if needs_price2 && order.price2.is_none() {
        return Err(RestError::InvalidParameter(format!(
            "{} orders need a secondary price",
            order.order_type
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_order() {
        assert!(validate_order(&OrderRequest::market("XBTUSD", OrderSide::Buy, dec!(1))).is_ok());
        assert!(validate_order(&OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(1), dec!(100))).is_ok());

        let missing_price = OrderRequest::new("XBTUSD", OrderSide::Buy, OrderType::Limit, dec!(1));
        assert!(matches!(
            validate_order(&missing_price),
            Err(RestError::InvalidParameter(_))
        ));

        let missing_price2 = OrderRequest::new("XBTUSD", OrderSide::Sell, OrderType::StopLossLimit, dec!(1))
            .with_price(dec!(100));
        assert!(validate_order(&missing_price2).is_err());

        let negative = OrderRequest::market("XBTUSD", OrderSide::Buy, dec!(-1));
        assert!(validate_order(&negative).is_err());

        // Volume 0 closes a leveraged position
        let close_all = OrderRequest::market("XBTUSD", OrderSide::Sell, dec!(0)).with_leverage("2");
        assert!(validate_order(&close_all).is_ok());
    }
}
