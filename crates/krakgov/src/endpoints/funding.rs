//! Funding endpoints for deposits, withdrawals and wallet transfers
//!
//! These endpoints require authentication.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::{fetch_list, require};
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::{RestError, RestResult};
use crate::types::funding::RefId;
use crate::types::{DepositAddress, DepositMethod, TransferStatus, WithdrawalInfo};

fn require_positive(name: &str, amount: Decimal) -> RestResult<()> {
    if amount <= Decimal::ZERO {
        return Err(RestError::InvalidParameter(format!("{name} must be positive, got {amount}")));
    }
    Ok(())
}

/// Funding endpoints
#[derive(Debug, Clone, Copy)]
pub struct FundingEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> FundingEndpoints<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get deposit methods for an asset
    ///
    /// # Arguments
    /// * `asset` - Asset to get deposit methods for (e.g., "XBT", "ETH")
    #[instrument(skip(self))]
    pub async fn deposit_methods(&self, asset: &str) -> RestResult<Vec<DepositMethod>> {
        require("asset", asset)?;
        let call = ApiCall::private("DepositMethods").param("asset", asset);
        fetch_list(self.dispatcher, call).await
    }

    /// Get deposit addresses
    ///
    /// # Arguments
    /// * `asset` - Asset to get addresses for
    /// * `method` - Deposit method name
    /// * `new` - Generate a new address
    #[instrument(skip(self))]
    pub async fn deposit_addresses(
        &self,
        asset: &str,
        method: &str,
        new: bool,
    ) -> RestResult<Vec<DepositAddress>> {
        require("asset", asset)?;
        require("method", method)?;
        let call = ApiCall::private("DepositAddresses")
            .param("asset", asset)
            .param("method", method)
            .flag("new", new);

        fetch_list(self.dispatcher, call).await
    }

    /// Get the status of recent deposits
    #[instrument(skip(self))]
    pub async fn deposit_status(&self, asset: &str, method: Option<&str>) -> RestResult<Vec<TransferStatus>> {
        require("asset", asset)?;
        let call = ApiCall::private("DepositStatus")
            .param("asset", asset)
            .opt_param("method", method);

        fetch_list(self.dispatcher, call).await
    }

    /// Quote a withdrawal: limit, net amount and fee
    ///
    /// # Arguments
    /// * `key` - Withdrawal key name, as set up in the account
    #[instrument(skip(self))]
    pub async fn withdrawal_info(&self, asset: &str, key: &str, amount: Decimal) -> RestResult<WithdrawalInfo> {
        require("asset", asset)?;
        require("key", key)?;
        require_positive("amount", amount)?;
        let call = ApiCall::private("WithdrawInfo")
            .param("asset", asset)
            .param("key", key)
            .param("amount", amount);

        self.dispatcher.execute_json(call).await
    }

    /// Withdraw funds to a configured withdrawal key; returns the reference ID
    #[instrument(skip(self))]
    pub async fn withdraw(&self, asset: &str, key: &str, amount: Decimal) -> RestResult<String> {
        require("asset", asset)?;
        require("key", key)?;
        require_positive("amount", amount)?;
        let call = ApiCall::private("Withdraw")
            .param("asset", asset)
            .param("key", key)
            .param("amount", amount);

        let result: RefId = self.dispatcher.execute_json(call).await?;
        info!(refid = %result.refid, "Withdrawal requested");
        Ok(result.refid)
    }

    /// Get the status of recent withdrawals
    #[instrument(skip(self))]
    pub async fn withdrawal_status(&self, asset: &str, method: Option<&str>) -> RestResult<Vec<TransferStatus>> {
        require("asset", asset)?;
        let call = ApiCall::private("WithdrawStatus")
            .param("asset", asset)
            .opt_param("method", method);

        fetch_list(self.dispatcher, call).await
    }

    /// Request cancellation of a withdrawal; `true` when accepted
    #[instrument(skip(self))]
    pub async fn cancel_withdrawal(&self, asset: &str, refid: &str) -> RestResult<bool> {
        require("asset", asset)?;
        require("refid", refid)?;
        let call = ApiCall::private("WithdrawCancel")
            .param("asset", asset)
            .param("refid", refid);

        self.dispatcher.execute_json(call).await
    }

    /// Move funds from the spot wallet to the futures wallet; returns the
    /// reference ID
    #[instrument(skip(self))]
    pub async fn transfer_to_futures(&self, asset: &str, amount: Decimal) -> RestResult<String> {
        require("asset", asset)?;
        require_positive("amount", amount)?;
        let call = ApiCall::private("WalletTransfer")
            .param("asset", asset)
            .param("from", "Spot Wallet")
            .param("to", "Futures Wallet")
            .param("amount", amount);

        let result: RefId = self.dispatcher.execute_json(call).await?;
        Ok(result.refid)
    }
}
