//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing: ATR[t] = (ATR[t-1] * (n-1) + TR[t]) / n,
//! seeded with the mean of the first n true ranges.
//! The first bar has no previous close, so the first defined ATR sits at
//! index n and a series needs n+1 bars to produce a value.

use rust_decimal::Decimal;

use crate::models::Bar;

use super::IndicatorError;

/// Wilder ATR over a fixed look-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtrIndicator {
    period: usize,
}

impl Default for AtrIndicator {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl AtrIndicator {
    /// A zero period is treated as 1.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// ATR series aligned with `bars`; warm-up entries are `None`.
    pub fn compute(&self, bars: &[Bar]) -> Vec<Option<Decimal>> {
        let n = bars.len();
        let mut result = vec![None; n];
        if n <= self.period {
            return result;
        }

        let period = Decimal::from(self.period as u64);
        let true_ranges: Vec<Decimal> = bars
            .windows(2)
            .map(|w| w[1].true_range(Some(w[0].close)))
            .collect();

        // true_ranges[i] belongs to bars[i + 1]
        let seed: Decimal = true_ranges[..self.period].iter().copied().sum::<Decimal>() / period;
        result[self.period] = Some(seed);

        let mut prev = seed;
        for (i, tr) in true_ranges.iter().enumerate().skip(self.period) {
            let atr = (prev * (period - Decimal::ONE) + *tr) / period;
            result[i + 1] = Some(atr);
            prev = atr;
        }

        result
    }

    /// Latest defined ATR value.
    ///
    /// # Errors
    /// `InsufficientBars` for fewer than `period` bars, `NoDefinedValue` when
    /// the series never leaves its warm-up.
    pub fn latest(&self, bars: &[Bar]) -> Result<Decimal, IndicatorError> {
        if bars.len() < self.period {
            return Err(IndicatorError::InsufficientBars {
                required: self.period,
                available: bars.len(),
            });
        }

        self.compute(bars)
            .into_iter()
            .rev()
            .flatten()
            .next()
            .ok_or(IndicatorError::NoDefinedValue {
                period: self.period,
                available: bars.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn make_ohlc_bars(data: &[(Decimal, Decimal, Decimal, Decimal)]) -> Vec<Bar> {
        let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
            })
            .collect()
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000000001),
            "expected {expected}, got {actual}"
        );
    }

    fn sample_bars() -> Vec<Bar> {
        make_ohlc_bars(&[
            (dec!(100), dec!(105), dec!(95), dec!(102)),  // no TR
            (dec!(102), dec!(108), dec!(100), dec!(106)), // TR = 8
            (dec!(106), dec!(107), dec!(98), dec!(99)),   // TR = 9
            (dec!(99), dec!(103), dec!(97), dec!(101)),   // TR = 6
            (dec!(101), dec!(106), dec!(100), dec!(105)), // TR = 6
        ])
    }

    #[test]
    fn test_atr_period_3() {
        let atr = AtrIndicator::new(3).compute(&sample_bars());

        assert_eq!(atr.len(), 5);
        assert!(atr[..3].iter().all(Option::is_none));
        // Seed: mean(8, 9, 6) = 23/3
        assert_close(atr[3].unwrap(), dec!(23) / dec!(3));
        // (23/3 * 2 + 6) / 3 = 64/9
        assert_close(atr[4].unwrap(), dec!(64) / dec!(9));
    }

    #[test]
    fn test_latest_reads_last_value() {
        let latest = AtrIndicator::new(3).latest(&sample_bars()).unwrap();
        assert_close(latest, dec!(64) / dec!(9));
    }

    #[test]
    fn test_gap_counts_toward_range() {
        let bars = make_ohlc_bars(&[
            (dec!(98), dec!(102), dec!(97), dec!(100)),
            (dec!(110), dec!(115), dec!(108), dec!(112)), // TR = 15
        ]);
        let atr = AtrIndicator::new(1).compute(&bars);
        assert_eq!(atr[1], Some(dec!(15)));
    }

    #[test]
    fn test_insufficient_bars() {
        let bars = sample_bars();
        let err = AtrIndicator::default().latest(&bars).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientBars {
                required: 14,
                available: 5
            }
        );
    }

    #[test]
    fn test_warm_up_only_has_no_value() {
        let bars = sample_bars();
        let err = AtrIndicator::new(5).latest(&bars).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::NoDefinedValue {
                period: 5,
                available: 5
            }
        );
    }

    #[test]
    fn test_constant_range_converges_to_range() {
        let rows: Vec<_> = (0..20)
            .map(|_| (dec!(50), dec!(52), dec!(48), dec!(50)))
            .collect();
        let bars = make_ohlc_bars(&rows);

        let latest = AtrIndicator::default().latest(&bars).unwrap();
        assert_eq!(latest, dec!(4));
    }
}
