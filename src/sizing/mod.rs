//! Sizing engine: ATR stop-loss advice, position sizing, reward projections
//! and trade records. Everything here is pure and synchronous.

mod atr_advisor;
mod config;
mod error;
mod position_sizer;
mod projector;
mod record_builder;

pub use atr_advisor::AtrAdvisor;
pub use config::{SizingConfig, DEFAULT_REWARD_RATIOS};
pub use error::SizingError;
pub use position_sizer::PositionSizer;
pub use projector::{project, RiskRewardProjector};
pub use record_builder::TradeRecordBuilder;
