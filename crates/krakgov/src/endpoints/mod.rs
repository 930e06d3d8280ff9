//! API endpoint implementations
//!
//! Each group borrows the client's [`Dispatcher`], so every call goes through
//! the same rate counter.

pub mod account;
pub mod exports;
pub mod funding;
pub mod market;
pub mod staking;
pub mod trading;

pub use account::AccountEndpoints;
pub use exports::ExportEndpoints;
pub use funding::FundingEndpoints;
pub use market::MarketEndpoints;
pub use staking::StakingEndpoints;
pub use trading::TradingEndpoints;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::{RestError, RestResult};

/// Call returning a keyed table; a missing or empty result is an empty map
pub(crate) async fn fetch_map<T: DeserializeOwned>(
    dispatcher: &Dispatcher,
    call: ApiCall,
) -> RestResult<HashMap<String, T>> {
    let value = dispatcher.execute(call).await?.into_json()?;
    if is_empty(&value) {
        return Ok(HashMap::new());
    }
    parse(value)
}

/// Call returning a list; a missing or empty result is an empty vector
pub(crate) async fn fetch_list<T: DeserializeOwned>(
    dispatcher: &Dispatcher,
    call: ApiCall,
) -> RestResult<Vec<T>> {
    let value = dispatcher.execute(call).await?.into_json()?;
    if is_empty(&value) {
        return Ok(Vec::new());
    }
    parse(value)
}

pub(crate) fn parse<T: DeserializeOwned>(value: Value) -> RestResult<T> {
    serde_json::from_value(value).map_err(|e| RestError::Parse(e.to_string()))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(members) => members.is_empty(),
        _ => false,
    }
}

/// Comma-join a list parameter, rejecting an empty list
pub(crate) fn join_required(name: &str, values: &[&str]) -> RestResult<String> {
    if values.is_empty() || values.iter().any(|v| v.is_empty()) {
        return Err(RestError::InvalidParameter(format!(
            "{name} needs at least one non-empty value"
        )));
    }
    Ok(values.join(","))
}

/// Reject an empty string parameter
pub(crate) fn require(name: &str, value: &str) -> RestResult<()> {
    if value.is_empty() {
        return Err(RestError::InvalidParameter(format!("{name} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_results() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!({"ZUSD": "1"})));
    }

    #[test]
    fn test_join_required() {
        assert_eq!(join_required("pair", &["XBTUSD", "ETHUSD"]).unwrap(), "XBTUSD,ETHUSD");
        assert!(matches!(
            join_required("pair", &[]),
            Err(RestError::InvalidParameter(_))
        ));
        assert!(require("asset", "").is_err());
    }
}
