//! Flat trade record handed to the trade log.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// Column names in the order every sink appends them.
///
/// Sinks append rows positionally, so this order is part of the record schema.
pub const RECORD_COLUMNS: [&str; 13] = [
    "timestamp",
    "ticker",
    "capital",
    "risk_percent",
    "entry_price",
    "stop_loss_price",
    "atr",
    "atr_multiplier",
    "suggested_stop_loss",
    "risk_amount",
    "per_share_risk",
    "share_count",
    "capital_used",
];

/// A single scalar cell of a trade record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    Text(String),
    Decimal(Decimal),
    Integer(u64),
    Empty,
}

impl RecordValue {
    /// JSON form used by webhook sinks. Decimals become JSON numbers so that
    /// spreadsheets store them as numbers, not text.
    pub fn to_json(&self) -> Value {
        match self {
            RecordValue::Text(s) => Value::String(s.clone()),
            RecordValue::Decimal(d) => d
                .to_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(d.to_string())),
            RecordValue::Integer(i) => Value::Number(Number::from(*i)),
            RecordValue::Empty => Value::String(String::new()),
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Text(s) => write!(f, "{}", s),
            RecordValue::Decimal(d) => write!(f, "{}", d),
            RecordValue::Integer(i) => write!(f, "{}", i),
            RecordValue::Empty => Ok(()),
        }
    }
}

/// Ordered snapshot of one sized trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    fields: Vec<(&'static str, RecordValue)>,
}

impl TradeRecord {
    /// Wrap already-ordered values. Callers go through `TradeRecordBuilder`,
    /// which guarantees the values line up with `RECORD_COLUMNS`.
    pub(crate) fn from_values(values: [RecordValue; RECORD_COLUMNS.len()]) -> Self {
        let fields = RECORD_COLUMNS.iter().copied().zip(values).collect();
        Self { fields }
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &RecordValue> + '_ {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn get(&self, column: &str) -> Option<&RecordValue> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Row payload for positional appends.
    pub fn to_json_row(&self) -> Vec<Value> {
        self.values().map(RecordValue::to_json).collect()
    }
}
