//! Staking endpoints

use rust_decimal::Decimal;
use tracing::instrument;

use super::{fetch_list, require};
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::{RestError, RestResult};
use crate::types::funding::RefId;
use crate::types::{StakeableAsset, StakingTransaction};

/// Staking endpoints
#[derive(Debug, Clone, Copy)]
pub struct StakingEndpoints<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> StakingEndpoints<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    async fn bond(&self, method_name: &str, asset: &str, amount: Decimal, method: &str) -> RestResult<String> {
        require("asset", asset)?;
        require("method", method)?;
        if amount <= Decimal::ZERO {
            return Err(RestError::InvalidParameter(format!("amount must be positive, got {amount}")));
        }

        let call = ApiCall::private(method_name)
            .param("asset", asset)
            .param("amount", amount)
            .param("method", method);

        let result: RefId = self.dispatcher.execute_json(call).await?;
        Ok(result.refid)
    }

    /// Stake an asset from the spot wallet; returns the reference ID
    ///
    /// # Arguments
    /// * `method` - Staking method, from [`stakeable_assets`](Self::stakeable_assets)
    #[instrument(skip(self))]
    pub async fn stake(&self, asset: &str, amount: Decimal, method: &str) -> RestResult<String> {
        self.bond("Stake", asset, amount, method).await
    }

    /// Unstake an asset back to the spot wallet; returns the reference ID
    #[instrument(skip(self))]
    pub async fn unstake(&self, asset: &str, amount: Decimal, method: &str) -> RestResult<String> {
        self.bond("Unstake", asset, amount, method).await
    }

    /// Assets that can be staked
    #[instrument(skip(self))]
    pub async fn stakeable_assets(&self) -> RestResult<Vec<StakeableAsset>> {
        fetch_list(self.dispatcher, ApiCall::private("Staking/Assets")).await
    }

    /// Staking transactions still in progress
    #[instrument(skip(self))]
    pub async fn pending_transactions(&self) -> RestResult<Vec<StakingTransaction>> {
        fetch_list(self.dispatcher, ApiCall::private("Staking/Pending")).await
    }

    /// Staking transactions from the last 90 days
    #[instrument(skip(self))]
    pub async fn transactions(&self) -> RestResult<Vec<StakingTransaction>> {
        fetch_list(self.dispatcher, ApiCall::private("Staking/Transactions")).await
    }
}
