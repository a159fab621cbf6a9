//! Technical indicators computed from daily bars.

mod atr;

pub use atr::AtrIndicator;

use thiserror::Error;

/// Market data cannot support the indicator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient market data: need at least {required} bars, got {available}")]
    InsufficientBars { required: usize, available: usize },

    #[error("insufficient market data: no defined {period}-period value in {available} bars")]
    NoDefinedValue { period: usize, available: usize },
}
