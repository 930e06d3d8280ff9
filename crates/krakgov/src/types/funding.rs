//! Deposit, withdrawal, transfer and staking types

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// Deposit method
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepositMethod {
    /// Method name
    pub method: String,
    /// Maximum net amount that can be deposited right now; `false` when unlimited
    #[serde(default)]
    pub limit: Value,
    /// Fee
    #[serde(default)]
    pub fee: Option<Decimal>,
    /// Address setup fee
    #[serde(rename = "address-setup-fee", default)]
    pub address_setup_fee: Option<Decimal>,
    /// Whether new addresses can be generated
    #[serde(rename = "gen-address", default)]
    pub gen_address: Option<bool>,
    /// Minimum deposit
    #[serde(default)]
    pub minimum: Option<Decimal>,
}

impl DepositMethod {
    /// Deposit limit, when there is one
    pub fn limit(&self) -> Option<Decimal> {
        super::row::decimal_value(&self.limit)
    }
}

/// Deposit address
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepositAddress {
    /// Address
    pub address: String,
    /// Expiry time (unix), `0` when it does not expire
    #[serde(default)]
    pub expiretm: Option<String>,
    /// Whether the address has never been used
    #[serde(default)]
    pub new: Option<bool>,
    /// Memo or tag, for assets that need one
    #[serde(default)]
    pub tag: Option<String>,
}

/// Status of a deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferStatus {
    /// Method name
    pub method: String,
    /// Asset class
    pub aclass: String,
    /// Asset
    pub asset: String,
    /// Reference ID
    pub refid: String,
    /// Method transaction ID
    #[serde(default)]
    pub txid: Option<String>,
    /// Method transaction information
    #[serde(default)]
    pub info: Option<String>,
    /// Amount
    pub amount: Decimal,
    /// Fee
    #[serde(default)]
    pub fee: Option<Decimal>,
    /// Unix time of the request
    pub time: i64,
    /// `Initial`, `Pending`, `Settled`, `Success` or `Failure`
    pub status: String,
    /// Additional status (`return`, `onhold`, `cancel-pending`, ...)
    #[serde(rename = "status-prop", default)]
    pub status_prop: Option<String>,
}

/// Withdrawal quote
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WithdrawalInfo {
    /// Withdrawal method
    pub method: String,
    /// Maximum net amount that can be withdrawn right now
    pub limit: Decimal,
    /// Net amount that will be sent after fees
    pub amount: Decimal,
    /// Fee
    pub fee: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefId {
    pub refid: String,
}

/// Asset that can be staked
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StakeableAsset {
    /// Staking method
    pub method: String,
    /// Asset to stake
    pub asset: String,
    /// Staked asset received
    pub staking_asset: String,
    /// Reward rates and schedule
    #[serde(default)]
    pub rewards: Value,
    /// Whether staking happens on chain
    #[serde(default)]
    pub on_chain: bool,
    /// Whether staking is allowed
    #[serde(default)]
    pub can_stake: bool,
    /// Whether unstaking is allowed
    #[serde(default)]
    pub can_unstake: bool,
    /// Minimum amounts for staking and unstaking
    #[serde(default)]
    pub minimum_amount: Value,
}

/// Staking or unstaking transaction
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StakingTransaction {
    /// Staking method
    pub method: String,
    /// Asset class
    pub aclass: String,
    /// Asset
    pub asset: String,
    /// Reference ID
    pub refid: String,
    /// Amount
    pub amount: Decimal,
    /// Fee
    #[serde(default)]
    pub fee: Option<Decimal>,
    /// Unix time
    pub time: i64,
    /// `Initial`, `Pending`, `Settled` or `Failure`
    pub status: String,
    /// `bonding`, `reward` or `unbonding`
    #[serde(rename = "type")]
    pub kind: String,
    /// Bonding start (unix)
    #[serde(default)]
    pub bond_start: Option<i64>,
    /// Bonding end (unix)
    #[serde(default)]
    pub bond_end: Option<i64>,
}
