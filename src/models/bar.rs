//! Daily OHLC bar.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily trading session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Bar {
    /// True range against the previous session's close.
    ///
    /// Without a previous close this is just `high - low`.
    pub fn true_range(&self, prev_close: Option<Decimal>) -> Decimal {
        let high_low = self.high - self.low;
        match prev_close {
            Some(pc) => high_low
                .max((self.high - pc).abs())
                .max((self.low - pc).abs()),
            None => high_low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn test_true_range_inside_bar() {
        let b = bar(dec!(102), dec!(108), dec!(100), dec!(106));
        assert_eq!(b.true_range(Some(dec!(102))), dec!(8));
        assert_eq!(b.true_range(None), dec!(8));
    }

    #[test]
    fn test_true_range_gap_up() {
        let b = bar(dec!(110), dec!(115), dec!(108), dec!(112));
        assert_eq!(b.true_range(Some(dec!(100))), dec!(15));
    }
}
