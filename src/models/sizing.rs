//! Sizing outcomes: the position size and the reward scenarios around it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of sizing one trade against a risk budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Maximum currency amount the trade may lose
    pub risk_amount: Decimal,

    /// Distance between entry and stop-loss
    pub per_share_risk: Decimal,

    /// Whole shares to buy, never exceeding the risk budget
    pub share_count: u64,

    /// Capital deployed at the entry price
    pub capital_used: Decimal,
}

impl SizingResult {
    /// True when the sizer declined to size (zero per-share risk or a budget
    /// smaller than one share's risk).
    pub fn is_unsized(&self) -> bool {
        self.share_count == 0
    }

    /// Money actually at risk if the stop is hit.
    pub fn risk_at_stop(&self) -> Decimal {
        self.per_share_risk * Decimal::from(self.share_count)
    }
}

/// Outcome of the trade if price reaches `ratio` times the per-share risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRewardRow {
    /// Reward-to-risk ratio (e.g. 2 for 1:2)
    pub ratio: Decimal,

    /// Price at which the ratio is achieved
    pub target_price: Decimal,

    /// Profit on each share at the target
    pub profit_per_share: Decimal,

    /// Profit on the whole position at the target
    pub total_profit: Decimal,
}

impl RiskRewardRow {
    /// Display label like `1:2.5`.
    pub fn label(&self) -> String {
        format!("1:{}", self.ratio.normalize())
    }
}
