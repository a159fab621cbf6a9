//! Fixed-fractional position sizing: risk a percentage of capital per trade.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{SizingResult, TradeInputs};

use super::SizingError;

/// Calculator for position sizes under a fixed risk budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer;

impl PositionSizer {
    pub fn new() -> Self {
        Self
    }

    /// Size a trade so that hitting the stop loses at most
    /// `capital * risk_percent / 100`.
    ///
    /// # Returns
    /// The sizing result, or `SizingError` for inputs that must not be
    /// computed on. A stop equal to the entry is not an error: it yields zero
    /// shares and zero capital used.
    pub fn size(&self, inputs: &TradeInputs) -> Result<SizingResult, SizingError> {
        inputs.validate()?;

        // risk_percent / 100 is at most 1, so the product never exceeds capital
        let risk_amount = (inputs.risk_percent / Decimal::ONE_HUNDRED)
            .checked_mul(inputs.capital)
            .ok_or(SizingError::Overflow("risk amount"))?;
        let per_share_risk = (inputs.entry_price - inputs.stop_loss_price).abs();

        if per_share_risk.is_zero() {
            debug!(entry = %inputs.entry_price, "Zero per-share risk, no trade sized");
            return Ok(SizingResult {
                risk_amount,
                per_share_risk,
                share_count: 0,
                capital_used: Decimal::ZERO,
            });
        }

        let share_count = Self::affordable_shares(risk_amount, per_share_risk)?;
        let capital_used = Decimal::from(share_count)
            .checked_mul(inputs.entry_price)
            .ok_or(SizingError::Overflow("capital used"))?;

        debug!(
            risk_amount = %risk_amount,
            per_share_risk = %per_share_risk,
            share_count = share_count,
            "Position sized"
        );

        Ok(SizingResult {
            risk_amount,
            per_share_risk,
            share_count,
            capital_used,
        })
    }

    /// Whole shares whose combined risk stays within `budget`.
    ///
    /// Truncates, never rounds. The decimal quotient is rounded at 28
    /// significant digits, so the floor is re-checked against the budget.
    fn affordable_shares(budget: Decimal, per_share_risk: Decimal) -> Result<u64, SizingError> {
        let quotient = budget
            .checked_div(per_share_risk)
            .ok_or(SizingError::Overflow("share count"))?;

        let mut shares = quotient.floor();
        while shares > Decimal::ZERO
            && shares
                .checked_mul(per_share_risk)
                .map_or(true, |risk| risk > budget)
        {
            shares -= Decimal::ONE;
        }

        shares.to_u64().ok_or(SizingError::Overflow("share count"))
    }
}
