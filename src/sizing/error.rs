//! Typed failures raised by the sizing engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid input, or a result outside the representable range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    #[error("capital must be positive, got {0}")]
    NonPositiveCapital(Decimal),

    #[error("risk percent must be in (0, 100], got {0}")]
    RiskPercentOutOfRange(Decimal),

    #[error("entry price must be positive, got {0}")]
    NonPositiveEntry(Decimal),

    #[error("stop-loss price must be positive, got {0}")]
    NonPositiveStopLoss(Decimal),

    #[error("ATR must be >= 0 and multiplier > 0, got atr={atr}, multiplier={multiplier}")]
    InvalidVolatility { atr: Decimal, multiplier: Decimal },

    #[error("reward ratios must be non-empty, positive and ascending")]
    InvalidRatios,

    #[error("{0} is too large to represent")]
    Overflow(&'static str),
}
