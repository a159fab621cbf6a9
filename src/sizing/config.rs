//! Sizing configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::SizingError;

/// Reward-to-risk ratios projected for every sized trade, ascending.
pub const DEFAULT_REWARD_RATIOS: [Decimal; 5] = [dec!(1), dec!(1.5), dec!(2), dec!(2.5), dec!(3)];

/// Configuration for the sizing engine and its ATR path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Reward-to-risk ratios to project, in display order
    pub reward_ratios: Vec<Decimal>,

    /// Look-back of the ATR indicator in sessions
    pub atr_period: usize,

    /// Default number of ATRs between entry and the suggested stop
    pub atr_multiplier: Decimal,

    /// Decimal places kept for ATR fields in logged records
    pub record_decimals: u32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            reward_ratios: DEFAULT_REWARD_RATIOS.to_vec(),
            atr_period: 14,
            atr_multiplier: dec!(1.5),
            record_decimals: 2,
        }
    }
}

impl SizingConfig {
    /// Check the configuration before any trade is evaluated with it.
    pub fn validate(&self) -> Result<(), SizingError> {
        let ascending = self.reward_ratios.windows(2).all(|w| w[0] < w[1]);
        let positive = self.reward_ratios.iter().all(|r| *r > Decimal::ZERO);
        if self.reward_ratios.is_empty() || !ascending || !positive {
            return Err(SizingError::InvalidRatios);
        }
        if self.atr_multiplier <= Decimal::ZERO {
            return Err(SizingError::InvalidVolatility {
                atr: Decimal::ZERO,
                multiplier: self.atr_multiplier,
            });
        }
        Ok(())
    }
}
