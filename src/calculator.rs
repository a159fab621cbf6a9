//! Calculator: resolves trade inputs and runs the sizing pipeline.
//!
//! Handles:
//! - Manual plans (entry and stop-loss given)
//! - ATR plans (entry from the latest close, stop-loss from ATR)
//! - Falling back to manual values when market data is unusable
//! - Building trade records and handing them to a trade sink

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::api::MarketDataProvider;
use crate::db::TradeSink;
use crate::indicators::{AtrIndicator, IndicatorError};
use crate::models::{RiskRewardRow, SizingResult, TradeInputs, TradeRecord, VolatilityReading};
use crate::sizing::{
    AtrAdvisor, PositionSizer, RiskRewardProjector, SizingConfig, SizingError, TradeRecordBuilder,
};

/// Where the stop-loss of a plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSource {
    Manual,
    Atr,
}

impl std::fmt::Display for StopSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopSource::Manual => write!(f, "manual"),
            StopSource::Atr => write!(f, "ATR"),
        }
    }
}

/// A request to plan a trade; missing prices are derived from market data.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub ticker: String,
    pub capital: Decimal,
    pub risk_percent: Decimal,

    /// Entry price; the latest close when absent
    pub entry_price: Option<Decimal>,

    /// Stop-loss; ATR-derived when absent
    pub stop_loss_price: Option<Decimal>,

    /// ATR multiplier; the configured default when absent
    pub atr_multiplier: Option<Decimal>,
}

impl PlanRequest {
    /// Both prices given, so market data is optional.
    pub fn is_manual(&self) -> bool {
        self.entry_price.is_some() && self.stop_loss_price.is_some()
    }

    /// Reject what can be rejected before touching market data.
    pub fn validate(&self) -> Result<(), SizingError> {
        TradeInputs::check_budget(self.capital, self.risk_percent)?;
        if let Some(entry) = self.entry_price {
            TradeInputs::check_entry(entry)?;
        }
        if let Some(stop) = self.stop_loss_price {
            TradeInputs::check_stop_loss(stop)?;
        }
        Ok(())
    }
}

/// Everything computed for one trade.
#[derive(Debug, Clone)]
pub struct TradePlan {
    pub ticker: String,
    pub inputs: TradeInputs,
    pub stop_source: StopSource,
    pub volatility: Option<VolatilityReading>,
    pub suggested_stop_loss: Option<Decimal>,
    pub sizing: SizingResult,
    pub projections: Vec<RiskRewardRow>,
}

/// Latest close and ATR of a symbol.
struct MarketSnapshot {
    last_close: Option<Decimal>,
    atr: Result<Decimal, IndicatorError>,
}

/// Runs Advisor → Sizer → Projector → Record Builder over injected market
/// data.
pub struct Calculator<P> {
    config: SizingConfig,
    provider: P,
    indicator: AtrIndicator,
    advisor: AtrAdvisor,
    sizer: PositionSizer,
    projector: RiskRewardProjector,
    record_builder: TradeRecordBuilder,
}

impl<P: MarketDataProvider> Calculator<P> {
    /// Create a calculator; the configuration is validated here.
    pub fn new(config: SizingConfig, provider: P) -> Result<Self, SizingError> {
        config.validate()?;

        Ok(Self {
            indicator: AtrIndicator::new(config.atr_period),
            advisor: AtrAdvisor::new(),
            sizer: PositionSizer::new(),
            projector: RiskRewardProjector::new(config.reward_ratios.clone()),
            record_builder: TradeRecordBuilder::new(config.record_decimals),
            config,
            provider,
        })
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Plan a trade from manual entry and stop-loss. No market data is used.
    pub fn plan_manual(
        &self,
        ticker: &str,
        capital: Decimal,
        risk_percent: Decimal,
        entry_price: Decimal,
        stop_loss_price: Decimal,
    ) -> Result<TradePlan, SizingError> {
        let inputs = TradeInputs::new(capital, risk_percent, entry_price, stop_loss_price)?;
        self.evaluate(ticker, inputs, StopSource::Manual, None)
    }

    /// Plan a trade, deriving missing prices from the symbol's daily bars.
    ///
    /// With both prices given, market data only adds the ATR reference and
    /// its failure is tolerated. Otherwise fetch failures and insufficient
    /// data are returned as errors.
    pub async fn plan(&self, request: &PlanRequest) -> Result<TradePlan> {
        request.validate()?;
        let multiplier = request.atr_multiplier.unwrap_or(self.config.atr_multiplier);

        let snapshot = match self.snapshot(&request.ticker).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) if request.is_manual() => {
                warn!(
                    ticker = %request.ticker,
                    error = %e,
                    "Market data unavailable, using manual entry and stop-loss"
                );
                None
            }
            Err(e) => return Err(e),
        };

        let (last_close, atr) = match snapshot {
            Some(s) => (s.last_close, Some(s.atr)),
            None => (None, None),
        };

        let entry_price = match (request.entry_price, last_close) {
            (Some(entry), _) => entry,
            (None, Some(close)) => close,
            (None, None) => anyhow::bail!(
                "No entry price given and no close available for {}",
                request.ticker
            ),
        };

        let volatility = match atr {
            Some(Ok(value)) => Some(VolatilityReading::new(value, multiplier)?),
            Some(Err(e)) if request.stop_loss_price.is_some() => {
                warn!(ticker = %request.ticker, error = %e, "ATR unavailable, using manual stop-loss");
                None
            }
            Some(Err(e)) => {
                return Err(e)
                    .with_context(|| format!("Cannot derive a stop-loss for {}", request.ticker))
            }
            None => None,
        };

        let (stop_loss_price, stop_source) = match (request.stop_loss_price, volatility) {
            (Some(stop), _) => (stop, StopSource::Manual),
            (None, Some(reading)) => (
                self.advisor.suggest_from_reading(entry_price, &reading),
                StopSource::Atr,
            ),
            (None, None) => anyhow::bail!(
                "No stop-loss given and no ATR available for {}",
                request.ticker
            ),
        };

        let inputs = TradeInputs::new(
            request.capital,
            request.risk_percent,
            entry_price,
            stop_loss_price,
        )
        .with_context(|| format!("Unusable {} stop-loss for {}", stop_source, request.ticker))?;

        Ok(self.evaluate(&request.ticker, inputs, stop_source, volatility)?)
    }

    /// Flatten a plan into a record stamped with `timestamp`.
    pub fn record(&self, plan: &TradePlan, timestamp: DateTime<Utc>) -> TradeRecord {
        self.record_builder.build(
            timestamp,
            &plan.ticker,
            &plan.inputs,
            plan.volatility.as_ref(),
            &plan.sizing,
        )
    }

    /// Append a plan to the trade log.
    ///
    /// Failures are logged and returned unchanged in meaning; the plan
    /// itself stays valid and the append is not retried.
    pub async fn log(&self, plan: &TradePlan, sink: &dyn TradeSink) -> Result<TradeRecord> {
        let record = self.record(plan, Utc::now());

        if let Err(e) = sink.append(&record).await {
            error!(sink = sink.name(), ticker = %plan.ticker, error = %e, "Failed to log trade");
            return Err(e.context(format!("Failed to log trade to {}", sink.name())));
        }

        info!(
            sink = sink.name(),
            ticker = %plan.ticker,
            shares = plan.sizing.share_count,
            "Trade logged"
        );
        Ok(record)
    }

    async fn snapshot(&self, ticker: &str) -> Result<MarketSnapshot> {
        let bars = self
            .provider
            .daily_bars(ticker)
            .await
            .with_context(|| format!("Failed to fetch market data for {}", ticker))?;

        Ok(MarketSnapshot {
            last_close: bars.last().map(|b| b.close),
            atr: self.indicator.latest(&bars),
        })
    }

    fn evaluate(
        &self,
        ticker: &str,
        inputs: TradeInputs,
        stop_source: StopSource,
        volatility: Option<VolatilityReading>,
    ) -> Result<TradePlan, SizingError> {
        let sizing = self.sizer.size(&inputs)?;
        let projections =
            self.projector
                .project(inputs.entry_price, sizing.per_share_risk, sizing.share_count)?;
        let suggested_stop_loss = volatility
            .as_ref()
            .map(|reading| self.advisor.suggest_from_reading(inputs.entry_price, reading));

        Ok(TradePlan {
            ticker: ticker.to_string(),
            inputs,
            stop_source,
            volatility,
            suggested_stop_loss,
            sizing,
            projections,
        })
    }
}
