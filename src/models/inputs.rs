//! Trade inputs and volatility readings fed into the sizing engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sizing::SizingError;

/// Everything the position sizer needs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInputs {
    /// Total trading capital in currency units
    pub capital: Decimal,

    /// Percentage of capital put at risk on this trade (0, 100]
    pub risk_percent: Decimal,

    /// Planned entry price per share
    pub entry_price: Decimal,

    /// Stop-loss price per share (manual or ATR-derived)
    pub stop_loss_price: Decimal,
}

impl TradeInputs {
    /// Build validated inputs.
    pub fn new(
        capital: Decimal,
        risk_percent: Decimal,
        entry_price: Decimal,
        stop_loss_price: Decimal,
    ) -> Result<Self, SizingError> {
        let inputs = Self {
            capital,
            risk_percent,
            entry_price,
            stop_loss_price,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// Reject values the sizer must never compute on.
    ///
    /// `entry_price == stop_loss_price` passes: the sizer answers it with a
    /// zero-sized result instead of an error.
    pub fn validate(&self) -> Result<(), SizingError> {
        Self::check_budget(self.capital, self.risk_percent)?;
        Self::check_entry(self.entry_price)?;
        Self::check_stop_loss(self.stop_loss_price)
    }

    pub fn check_budget(capital: Decimal, risk_percent: Decimal) -> Result<(), SizingError> {
        if capital <= Decimal::ZERO {
            return Err(SizingError::NonPositiveCapital(capital));
        }
        if risk_percent <= Decimal::ZERO || risk_percent > Decimal::ONE_HUNDRED {
            return Err(SizingError::RiskPercentOutOfRange(risk_percent));
        }
        Ok(())
    }

    pub fn check_entry(entry_price: Decimal) -> Result<(), SizingError> {
        if entry_price <= Decimal::ZERO {
            return Err(SizingError::NonPositiveEntry(entry_price));
        }
        Ok(())
    }

    pub fn check_stop_loss(stop_loss_price: Decimal) -> Result<(), SizingError> {
        if stop_loss_price <= Decimal::ZERO {
            return Err(SizingError::NonPositiveStopLoss(stop_loss_price));
        }
        Ok(())
    }
}

/// Latest ATR value and the multiplier applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityReading {
    /// Most recent defined ATR, in price units
    pub atr_value: Decimal,

    /// How many ATRs below entry the stop sits
    pub multiplier: Decimal,
}

impl VolatilityReading {
    pub fn new(atr_value: Decimal, multiplier: Decimal) -> Result<Self, SizingError> {
        let reading = Self {
            atr_value,
            multiplier,
        };
        reading.validate()?;
        Ok(reading)
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        if self.atr_value < Decimal::ZERO || self.multiplier <= Decimal::ZERO {
            return Err(SizingError::InvalidVolatility {
                atr: self.atr_value,
                multiplier: self.multiplier,
            });
        }
        if self.atr_value.checked_mul(self.multiplier).is_none() {
            return Err(SizingError::Overflow("stop distance"));
        }
        Ok(())
    }

    /// Stop distance in price units (`atr × multiplier`).
    pub fn stop_distance(&self) -> Decimal {
        self.atr_value * self.multiplier
    }

    /// Stop-loss this reading suggests for the given entry.
    pub fn suggested_stop_loss(&self, entry_price: Decimal) -> Decimal {
        entry_price - self.stop_distance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_inputs() {
        let inputs = TradeInputs::new(dec!(100000), dec!(1.0), dec!(390), dec!(378)).unwrap();
        assert_eq!(inputs.entry_price, dec!(390));
    }

    #[test]
    fn test_equal_entry_and_stop_is_allowed() {
        assert!(TradeInputs::new(dec!(1000), dec!(2), dec!(100), dec!(100)).is_ok());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(
            TradeInputs::new(dec!(0), dec!(1), dec!(100), dec!(90)),
            Err(SizingError::NonPositiveCapital(dec!(0)))
        );
        assert_eq!(
            TradeInputs::new(dec!(1000), dec!(0), dec!(100), dec!(90)),
            Err(SizingError::RiskPercentOutOfRange(dec!(0)))
        );
        assert_eq!(
            TradeInputs::new(dec!(1000), dec!(100.5), dec!(100), dec!(90)),
            Err(SizingError::RiskPercentOutOfRange(dec!(100.5)))
        );
        assert_eq!(
            TradeInputs::new(dec!(1000), dec!(1), dec!(-5), dec!(90)),
            Err(SizingError::NonPositiveEntry(dec!(-5)))
        );
        assert_eq!(
            TradeInputs::new(dec!(1000), dec!(1), dec!(100), dec!(0)),
            Err(SizingError::NonPositiveStopLoss(dec!(0)))
        );
    }

    #[test]
    fn test_full_risk_percent_is_allowed() {
        assert!(TradeInputs::new(dec!(1000), dec!(100), dec!(10), dec!(9)).is_ok());
    }

    #[test]
    fn test_volatility_reading() {
        let reading = VolatilityReading::new(dec!(10.0), dec!(1.5)).unwrap();
        assert_eq!(reading.stop_distance(), dec!(15.0));
        assert_eq!(reading.suggested_stop_loss(dec!(390.0)), dec!(375.0));

        assert!(VolatilityReading::new(dec!(-1), dec!(1.5)).is_err());
        assert!(VolatilityReading::new(dec!(1), dec!(0)).is_err());
        assert!(VolatilityReading::new(dec!(0), dec!(2)).is_ok());
    }

    #[test]
    fn test_volatility_reading_out_of_range() {
        assert_eq!(
            VolatilityReading::new(dec!(4), Decimal::MAX),
            Err(SizingError::Overflow("stop distance"))
        );
    }
}
