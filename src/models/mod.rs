//! Data models for trade inputs, sizing results, market bars and records.

mod bar;
mod inputs;
mod record;
mod sizing;

pub use bar::Bar;
pub use inputs::{TradeInputs, VolatilityReading};
pub use record::{RecordValue, TradeRecord, RECORD_COLUMNS};
pub use sizing::{RiskRewardRow, SizingResult};
