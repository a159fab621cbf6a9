//! Swing Trade Risk & Position Size Calculator
//!
//! Sizes a position from capital, risk percentage, entry and stop-loss,
//! optionally deriving the stop from ATR, and projects reward-to-risk
//! scenarios. Sized trades can be appended to a trade log.

mod api;
mod calculator;
mod db;
mod indicators;
mod models;
mod sizing;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{CachedProvider, DataClient, DEFAULT_FRESHNESS};
use crate::calculator::{Calculator, PlanRequest, TradePlan};
use crate::db::{Database, SheetWebhookSink, TradeSink};
use crate::sizing::SizingConfig;

/// Swing trade position sizing CLI.
#[derive(Parser)]
#[command(name = "swingsize")]
#[command(about = "Size swing trades by risk, with ATR stop-losses and R:R targets", long_about = None)]
struct Cli {
    /// Database file path for the trade log
    #[arg(short, long, env = "SWING_DATABASE", default_value = "sqlite:./swingsize.db?mode=rwc")]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Where `--log` appends trade records
    #[arg(long, env = "SWING_SINK", value_enum, default_value = "sqlite")]
    sink: SinkKind,

    /// Spreadsheet append webhook (required for the webhook sink)
    #[arg(long, env = "SWING_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Seconds a fetched price series stays fresh (default one hour)
    #[arg(long, env = "SWING_CACHE_TTL_SECS")]
    cache_ttl: Option<u64>,

    /// Chart API base URL
    #[arg(long, env = "SWING_DATA_URL")]
    data_url: Option<String>,

    /// Look-back window requested for daily bars
    #[arg(long, env = "SWING_DATA_RANGE", default_value = "3mo")]
    range: String,

    /// Currency symbol used in output
    #[arg(long, env = "SWING_CURRENCY", default_value = "₹")]
    currency: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkKind {
    Sqlite,
    Webhook,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a trade from a manual entry and stop-loss
    Size {
        /// Total capital
        #[arg(short, long, default_value = "100000")]
        capital: Decimal,

        /// Risk percent per trade
        #[arg(short, long, default_value = "1.0")]
        risk: Decimal,

        /// Entry price
        #[arg(short, long, default_value = "390")]
        entry: Decimal,

        /// Stop-loss price
        #[arg(short, long, default_value = "378")]
        stop: Decimal,

        /// Ticker symbol recorded with the trade
        #[arg(short, long, default_value = "")]
        ticker: String,

        /// Append the sized trade to the trade log
        #[arg(long)]
        log: bool,
    },

    /// Size a trade using market data: entry from the latest close and
    /// stop-loss from ATR unless given
    Plan {
        /// Ticker symbol (e.g. INFY.NS)
        #[arg(short, long)]
        ticker: String,

        /// Total capital
        #[arg(short, long, default_value = "100000")]
        capital: Decimal,

        /// Risk percent per trade
        #[arg(short, long, default_value = "1.0")]
        risk: Decimal,

        /// Entry price (defaults to the latest close)
        #[arg(short, long)]
        entry: Option<Decimal>,

        /// Stop-loss price (defaults to entry - ATR x multiplier)
        #[arg(short, long)]
        stop: Option<Decimal>,

        /// ATR multiplier; repeat to compare several
        #[arg(short, long)]
        multiplier: Vec<Decimal>,

        /// Append the sized trade(s) to the trade log
        #[arg(long)]
        log: bool,
    },

    /// Show logged trades
    History {
        /// Maximum number of trades to show
        #[arg(short, long, default_value = "20")]
        limit: u32,

        /// Only show trades for this ticker
        #[arg(short, long)]
        ticker: Option<String>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SizingConfig::default();
    let client = match &cli.data_url {
        Some(url) => DataClient::with_base_url(url.clone())?,
        None => DataClient::new()?,
    };
    let freshness = cli
        .cache_ttl
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_FRESHNESS);
    let provider = CachedProvider::new(client.with_range(cli.range.clone()), freshness);
    let calculator = Calculator::new(config, provider)?;

    match &cli.command {
        Commands::Size {
            capital,
            risk,
            entry,
            stop,
            ticker,
            log,
        } => {
            let plan = calculator.plan_manual(ticker, *capital, *risk, *entry, *stop)?;
            print_plan(&plan, &cli.currency);

            if *log {
                log_plans(&cli, &calculator, std::slice::from_ref(&plan)).await;
            }
        }

        Commands::Plan {
            ticker,
            capital,
            risk,
            entry,
            stop,
            multiplier,
            log,
        } => {
            info!(ticker = %ticker, "Planning trade from market data");

            let multipliers: Vec<Option<Decimal>> = if multiplier.is_empty() {
                vec![None]
            } else {
                multiplier.iter().copied().map(Some).collect()
            };

            let mut plans = Vec::with_capacity(multipliers.len());
            for atr_multiplier in multipliers {
                let request = PlanRequest {
                    ticker: ticker.clone(),
                    capital: *capital,
                    risk_percent: *risk,
                    entry_price: *entry,
                    stop_loss_price: *stop,
                    atr_multiplier,
                };
                let plan = calculator.plan(&request).await?;
                print_plan(&plan, &cli.currency);
                plans.push(plan);
            }

            if *log {
                log_plans(&cli, &calculator, &plans).await;
            }
        }

        Commands::History { limit, ticker } => {
            let db = Database::new(&cli.database).await?;
            let trades = match ticker {
                Some(t) => db.trades_for_ticker(t, *limit).await?,
                None => db.recent_trades(*limit).await?,
            };

            if trades.is_empty() {
                println!("No trades logged yet. Use 'swingsize size --log' to add one.");
                return Ok(());
            }

            println!(
                "\n{:<20} {:<12} {:>10} {:>10} {:>8} {:>8} {:>12} {:>14}",
                "TIME", "TICKER", "ENTRY", "STOP", "ATR", "SHARES", "RISK", "CAPITAL USED"
            );
            println!("{}", "-".repeat(102));

            for t in trades {
                let atr = t.atr.map(|a| format!("{:.2}", a)).unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<20} {:<12} {:>10.2} {:>10.2} {:>8} {:>8} {:>12.2} {:>14.2}",
                    t.timestamp,
                    truncate(&t.ticker, 12),
                    t.entry_price,
                    t.stop_loss_price,
                    atr,
                    t.share_count,
                    t.risk_amount,
                    t.capital_used
                );
            }
        }

        Commands::Config => {
            let config = calculator.config();

            println!("\n=== Sizing Configuration ===\n");
            println!("Reward Ratios:        {}", config
                .reward_ratios
                .iter()
                .map(|r| format!("1:{}", r.normalize()))
                .collect::<Vec<_>>()
                .join("  "));
            println!("ATR Period:           {}", config.atr_period);
            println!("ATR Multiplier:       {}", config.atr_multiplier);
            println!("Record Decimals:      {}", config.record_decimals);

            println!("\n=== Collaborators ===\n");
            println!("Price Range:          {}", cli.range);
            println!("Price Cache TTL:      {}s", calculator.provider().freshness().as_secs());
            println!("Trade Log Sink:       {:?}", cli.sink);
            println!("Database:             {}", cli.database);
            println!(
                "Webhook URL:          {}",
                cli.webhook_url.as_deref().unwrap_or("(not set)")
            );
        }
    }

    Ok(())
}

/// Open the configured sink.
async fn open_sink(cli: &Cli) -> Result<Box<dyn TradeSink>> {
    match cli.sink {
        SinkKind::Sqlite => Ok(Box::new(Database::new(&cli.database).await?)),
        SinkKind::Webhook => {
            let url = cli
                .webhook_url
                .clone()
                .context("The webhook sink needs --webhook-url or SWING_WEBHOOK_URL")?;
            Ok(Box::new(SheetWebhookSink::new(url)?))
        }
    }
}

/// Append plans to the trade log. Failures are reported, never fatal: the
/// plans are already on screen.
async fn log_plans<P: api::MarketDataProvider>(
    cli: &Cli,
    calculator: &Calculator<P>,
    plans: &[TradePlan],
) {
    let sink = match open_sink(cli).await {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("\nCould not open trade log: {:#}", e);
            return;
        }
    };

    for plan in plans {
        match calculator.log(plan, sink.as_ref()).await {
            Ok(_) => println!("\nLogged {} to {}.", display_ticker(&plan.ticker), sink.name()),
            Err(e) => eprintln!("\nTrade not logged: {:#}", e),
        }
    }
}

fn print_plan(plan: &TradePlan, currency: &str) {
    let money = |d: Decimal| format!("{}{}", currency, format_amount(d));
    let inputs = &plan.inputs;
    let sizing = &plan.sizing;

    println!("\n=== {} ===", display_ticker(&plan.ticker));
    println!("Capital:          {}", money(inputs.capital));
    println!("Risk per Trade:   {}%", inputs.risk_percent.normalize());
    println!("Entry:            {}", money(inputs.entry_price));
    println!("Stop-Loss:        {} ({})", money(inputs.stop_loss_price), plan.stop_source);

    if let Some(v) = &plan.volatility {
        println!("ATR:              {} x {}", format_amount(v.atr_value), v.multiplier.normalize());
    }
    if let Some(s) = plan.suggested_stop_loss {
        println!("ATR Stop-Loss:    {}", money(s));
    }

    println!("\n--- Results ---");
    println!("Max Risk:         {}", money(sizing.risk_amount));
    println!("Risk per Share:   {}", money(sizing.per_share_risk));
    println!("Shares to Buy:    {}", sizing.share_count);
    println!("Capital Used:     {}", money(sizing.capital_used));

    if sizing.per_share_risk.is_zero() {
        println!("\nEntry equals stop-loss: no position sized.");
    } else if sizing.is_unsized() {
        println!("\nRisk budget is smaller than the risk of one share.");
    }
    if sizing.capital_used > inputs.capital {
        println!("\nWarning: position needs more than the available capital.");
    }

    println!("\n--- Reward Scenarios ---");
    println!("{:<8} {:>14} {:>16} {:>16}", "R:R", "TARGET", "PROFIT/SHARE", "TOTAL PROFIT");
    for row in &plan.projections {
        println!(
            "{:<8} {:>14} {:>16} {:>16}",
            row.label(),
            format_amount(row.target_price),
            format_amount(row.profit_per_share),
            format_amount(row.total_profit)
        );
    }
}

fn display_ticker(ticker: &str) -> &str {
    if ticker.is_empty() {
        "Trade"
    } else {
        ticker
    }
}

/// Two decimals with thousands separators, e.g. `32,370.00`.
fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Truncate a string with ellipsis if too long.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(32370)), "32,370.00");
        assert_eq!(format_amount(dec!(1000.005)), "1,000.01");
        assert_eq!(format_amount(dec!(0.125)), "0.13");
        assert_eq!(format_amount(dec!(-2.345)), "-2.35");
        assert_eq!(format_amount(dec!(999.5)), "999.50");
        assert_eq!(format_amount(dec!(-1234567.891)), "-1,234,567.89");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("INFY.NS", 12), "INFY.NS");
        assert_eq!(truncate("RELIANCEINDUSTRIES.NS", 12), "RELIANCEI...");
    }

    #[test]
    fn test_cli_parses_plan() {
        let cli = Cli::try_parse_from([
            "swingsize", "plan", "--ticker", "INFY.NS", "-m", "1.5", "-m", "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Plan {
                ticker, multiplier, entry, ..
            } => {
                assert_eq!(ticker, "INFY.NS");
                assert_eq!(multiplier, vec![dec!(1.5), dec!(2)]);
                assert!(entry.is_none());
            }
            _ => panic!("expected plan command"),
        }
    }
}
