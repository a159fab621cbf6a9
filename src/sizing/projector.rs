//! Reward-to-risk projections for a sized position.

use rust_decimal::Decimal;

use crate::models::RiskRewardRow;

use super::{SizingError, DEFAULT_REWARD_RATIOS};

/// Projects target prices and profits at a set of reward-to-risk ratios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskRewardProjector {
    ratios: Vec<Decimal>,
}

impl Default for RiskRewardProjector {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_RATIOS.to_vec())
    }
}

impl RiskRewardProjector {
    /// Create a projector for the given ratios. Rows come out in this order.
    pub fn new(ratios: Vec<Decimal>) -> Self {
        Self { ratios }
    }

    /// One row per configured ratio.
    ///
    /// An unsized trade (`share_count == 0`) still gets its targets, with
    /// zero total profit.
    pub fn project(
        &self,
        entry_price: Decimal,
        per_share_risk: Decimal,
        share_count: u64,
    ) -> Result<Vec<RiskRewardRow>, SizingError> {
        project(entry_price, per_share_risk, share_count, &self.ratios)
    }
}

/// Rows for `ratios`, in the order given.
pub fn project(
    entry_price: Decimal,
    per_share_risk: Decimal,
    share_count: u64,
    ratios: &[Decimal],
) -> Result<Vec<RiskRewardRow>, SizingError> {
    let shares = Decimal::from(share_count);
    ratios
        .iter()
        .map(|&ratio| {
            let profit_per_share = per_share_risk
                .checked_mul(ratio)
                .ok_or(SizingError::Overflow("profit per share"))?;
            let target_price = entry_price
                .checked_add(profit_per_share)
                .ok_or(SizingError::Overflow("target price"))?;
            let total_profit = profit_per_share
                .checked_mul(shares)
                .ok_or(SizingError::Overflow("total profit"))?;

            Ok(RiskRewardRow {
                ratio,
                target_price,
                profit_per_share,
                total_profit,
            })
        })
        .collect()
}
