//! Helpers for the positional arrays Kraken uses for candles, book levels,
//! trades and spreads
//!
//! Cells arrive as strings (`"30243.4"`) or bare numbers (`1688671200`,
//! `1688671969.1234`) depending on the column, so every accessor accepts
//! both.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{RestError, RestResult};

/// One positional row
pub(crate) struct Row<'a> {
    kind: &'static str,
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    pub(crate) fn new(kind: &'static str, value: &'a Value) -> RestResult<Self> {
        let cells = value
            .as_array()
            .ok_or_else(|| RestError::Parse(format!("{kind} row is not an array: {value}")))?;
        Ok(Self { kind, cells })
    }

    fn cell(&self, index: usize) -> RestResult<&'a Value> {
        self.cells.get(index).ok_or_else(|| {
            RestError::Parse(format!(
                "{} row has {} columns, wanted column {}",
                self.kind,
                self.cells.len(),
                index
            ))
        })
    }

    pub(crate) fn decimal(&self, index: usize) -> RestResult<Decimal> {
        decimal_value(self.cell(index)?)
            .ok_or_else(|| self.bad_cell(index, "decimal"))
    }

    pub(crate) fn float(&self, index: usize) -> RestResult<f64> {
        float_value(self.cell(index)?).ok_or_else(|| self.bad_cell(index, "number"))
    }

    /// Integer column; fractional values are truncated
    pub(crate) fn int(&self, index: usize) -> RestResult<i64> {
        int_value(self.cell(index)?).ok_or_else(|| self.bad_cell(index, "integer"))
    }

    pub(crate) fn text(&self, index: usize) -> RestResult<&'a str> {
        self.cell(index)?
            .as_str()
            .ok_or_else(|| self.bad_cell(index, "string"))
    }

    pub(crate) fn opt_int(&self, index: usize) -> Option<i64> {
        self.cells.get(index).and_then(int_value)
    }

    fn bad_cell(&self, index: usize, wanted: &str) -> RestError {
        RestError::Parse(format!(
            "{} column {} is not a {}: {}",
            self.kind,
            index,
            wanted,
            self.cells.get(index).unwrap_or(&Value::Null)
        ))
    }
}

pub(crate) fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
        }
        _ => None,
    }
}

pub(crate) fn float_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

pub(crate) fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
        _ => None,
    }
}

/// Split a `{"<pair>": [...], "last": ...}` result into its rows and cursor
///
/// Kraken keys the rows by its canonical pair name, which can differ from
/// the name in the request (`XBTUSD` comes back as `XXBTZUSD`), so the rows
/// are taken from the first member that is not `last`.
pub(crate) fn pair_rows(kind: &'static str, result: &Value) -> RestResult<(Vec<Value>, i64)> {
    if result.is_null() {
        return Ok((Vec::new(), 0));
    }
    let object = as_object(kind, result)?;

    let last = match object.get("last") {
        Some(value) => int_value(value)
            .ok_or_else(|| RestError::Parse(format!("{kind} cursor is not an integer: {value}")))?,
        None => 0,
    };

    let rows = object
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .map(|(_, rows)| rows.as_array().cloned().unwrap_or_default())
        .unwrap_or_default();

    Ok((rows, last))
}

pub(crate) fn as_object<'a>(kind: &'static str, value: &'a Value) -> RestResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| RestError::Parse(format!("{kind} result is not an object: {value}")))
}
