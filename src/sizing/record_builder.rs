//! Flattens a sized trade into a `TradeRecord` for the trade log.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{RecordValue, SizingResult, TradeInputs, TradeRecord, VolatilityReading};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds records with a stable column order (see `RECORD_COLUMNS`).
#[derive(Debug, Clone, Copy)]
pub struct TradeRecordBuilder {
    decimals: u32,
}

impl Default for TradeRecordBuilder {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TradeRecordBuilder {
    /// `decimals` applies to the ATR and suggested stop-loss columns only.
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn build(
        &self,
        timestamp: DateTime<Utc>,
        ticker: &str,
        inputs: &TradeInputs,
        atr_reading: Option<&VolatilityReading>,
        sizing: &SizingResult,
    ) -> TradeRecord {
        let (atr, multiplier, suggested) = match atr_reading {
            Some(reading) => (
                RecordValue::Decimal(self.round(reading.atr_value)),
                RecordValue::Decimal(reading.multiplier),
                RecordValue::Decimal(self.round(reading.suggested_stop_loss(inputs.entry_price))),
            ),
            None => (RecordValue::Empty, RecordValue::Empty, RecordValue::Empty),
        };

        TradeRecord::from_values([
            RecordValue::Text(timestamp.format(TIMESTAMP_FORMAT).to_string()),
            RecordValue::Text(ticker.to_string()),
            RecordValue::Decimal(inputs.capital),
            RecordValue::Decimal(inputs.risk_percent),
            RecordValue::Decimal(inputs.entry_price),
            RecordValue::Decimal(inputs.stop_loss_price),
            atr,
            multiplier,
            suggested,
            RecordValue::Decimal(sizing.risk_amount),
            RecordValue::Decimal(sizing.per_share_risk),
            RecordValue::Integer(sizing.share_count),
            RecordValue::Decimal(sizing.capital_used),
        ])
    }

    fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::models::RECORD_COLUMNS;
    use crate::sizing::PositionSizer;

    fn fixture() -> (DateTime<Utc>, TradeInputs, SizingResult) {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let inputs = TradeInputs::new(dec!(100000), dec!(1), dec!(390), dec!(375)).unwrap();
        let sizing = PositionSizer::new().size(&inputs).unwrap();
        (timestamp, inputs, sizing)
    }

    #[test]
    fn test_column_order() {
        let (ts, inputs, sizing) = fixture();
        let record = TradeRecordBuilder::default().build(ts, "INFY.NS", &inputs, None, &sizing);

        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, RECORD_COLUMNS.to_vec());
        assert_eq!(record.len(), 13);
    }

    #[test]
    fn test_values_with_atr() {
        let (ts, inputs, sizing) = fixture();
        let reading = VolatilityReading::new(dec!(10.004999), dec!(1.5)).unwrap();
        let record =
            TradeRecordBuilder::default().build(ts, "INFY.NS", &inputs, Some(&reading), &sizing);

        assert_eq!(
            record.get("timestamp"),
            Some(&RecordValue::Text("2024-03-15 09:30:00".to_string()))
        );
        assert_eq!(record.get("ticker"), Some(&RecordValue::Text("INFY.NS".to_string())));
        assert_eq!(record.get("atr"), Some(&RecordValue::Decimal(dec!(10.00))));
        // 390 - 15.0074985 = 374.9925015
        assert_eq!(
            record.get("suggested_stop_loss"),
            Some(&RecordValue::Decimal(dec!(374.99)))
        );
        assert_eq!(record.get("share_count"), Some(&RecordValue::Integer(66)));
        assert_eq!(record.get("capital_used"), Some(&RecordValue::Decimal(dec!(25740))));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        let (ts, inputs, sizing) = fixture();
        let reading = VolatilityReading::new(dec!(2.345), dec!(2)).unwrap();
        let record =
            TradeRecordBuilder::default().build(ts, "X", &inputs, Some(&reading), &sizing);

        assert_eq!(record.get("atr"), Some(&RecordValue::Decimal(dec!(2.35))));
    }

    #[test]
    fn test_sizing_fields_keep_full_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let inputs = TradeInputs::new(dec!(12345.678), dec!(1.25), dec!(10.123), dec!(9.5)).unwrap();
        let sizing = PositionSizer::new().size(&inputs).unwrap();
        let record = TradeRecordBuilder::default().build(ts, "X", &inputs, None, &sizing);

        assert_eq!(
            record.get("risk_amount"),
            Some(&RecordValue::Decimal(dec!(154.320975)))
        );
        assert_eq!(record.get("atr"), Some(&RecordValue::Empty));
        assert_eq!(record.get("atr_multiplier"), Some(&RecordValue::Empty));
    }
}
