//! ATR-based stop-loss suggestion.

use rust_decimal::Decimal;

use crate::models::VolatilityReading;

use super::SizingError;

/// Suggests a stop-loss a fixed number of ATRs below the entry.
///
/// The advisor only consumes the latest ATR scalar; how the ATR series was
/// produced is the indicator's business.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtrAdvisor;

impl AtrAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// `entry_price - atr_value * multiplier`.
    ///
    /// The result is not checked for sign: a wide ATR on a cheap stock can
    /// put it at or below zero, and callers must validate it before sizing.
    pub fn suggest_stop_loss(
        &self,
        entry_price: Decimal,
        atr_value: Decimal,
        multiplier: Decimal,
    ) -> Result<Decimal, SizingError> {
        let reading = VolatilityReading::new(atr_value, multiplier)?;
        Ok(self.suggest_from_reading(entry_price, &reading))
    }

    /// Same as `suggest_stop_loss` for an already-validated reading.
    pub fn suggest_from_reading(&self, entry_price: Decimal, reading: &VolatilityReading) -> Decimal {
        reading.suggested_stop_loss(entry_price)
    }
}
