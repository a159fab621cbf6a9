//! Trade log persistence.
//!
//! Sized trades are appended as flat rows, one column per record field,
//! either to a local SQLite database or to a spreadsheet webhook.

mod webhook;

pub use webhook::{interpret_response, AppendOutcome, SheetWebhookSink};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::debug;

use crate::models::{RecordValue, TradeRecord, RECORD_COLUMNS};

/// Destination for trade records.
///
/// An append either succeeds or returns a descriptive error; sinks never
/// retry on their own.
#[async_trait]
pub trait TradeSink: Send + Sync {
    /// Short name for logs and messages.
    fn name(&self) -> &str;

    /// Append one record as a new row.
    async fn append(&self, record: &TradeRecord) -> Result<()>;
}

/// Trade log row as stored in SQLite.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredTrade {
    pub id: i64,
    pub timestamp: String,
    pub ticker: String,
    pub capital: f64,
    pub risk_percent: f64,
    pub entry_price: f64,
    pub stop_loss_price: f64,
    pub atr: Option<f64>,
    pub atr_multiplier: Option<f64>,
    pub suggested_stop_loss: Option<f64>,
    pub risk_amount: f64,
    pub per_share_risk: f64,
    pub share_count: i64,
    pub capital_used: f64,
    pub logged_at: String,
}

/// SQLite trade log.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Every connection to an in-memory database is a separate database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trade_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                ticker TEXT NOT NULL DEFAULT '',
                capital REAL NOT NULL,
                risk_percent REAL NOT NULL,
                entry_price REAL NOT NULL,
                stop_loss_price REAL NOT NULL,
                atr REAL,
                atr_multiplier REAL,
                suggested_stop_loss REAL,
                risk_amount REAL NOT NULL,
                per_share_risk REAL NOT NULL,
                share_count INTEGER NOT NULL,
                capital_used REAL NOT NULL,
                logged_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trade_log_ticker ON trade_log(ticker)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trade_log_logged_at ON trade_log(logged_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a record, binding values in column order.
    pub async fn insert_record(&self, record: &TradeRecord) -> Result<i64> {
        let sql = insert_sql();
        let mut query = sqlx::query(&sql);

        for value in record.values() {
            query = match value {
                RecordValue::Text(s) => query.bind(s.clone()),
                RecordValue::Decimal(d) => query.bind(d.to_f64()),
                RecordValue::Integer(i) => query.bind(i64::try_from(*i).unwrap_or(i64::MAX)),
                RecordValue::Empty => query.bind(None::<f64>),
            };
        }

        let result = query
            .execute(&self.pool)
            .await
            .context("Failed to insert trade record")?;

        let id = result.last_insert_rowid();
        debug!(id = id, "Trade record stored");
        Ok(id)
    }

    /// Most recent trades, newest first.
    pub async fn recent_trades(&self, limit: u32) -> Result<Vec<StoredTrade>> {
        sqlx::query_as::<_, StoredTrade>("SELECT * FROM trade_log ORDER BY id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch trade log")
    }

    /// Trades logged for one ticker, newest first.
    pub async fn trades_for_ticker(&self, ticker: &str, limit: u32) -> Result<Vec<StoredTrade>> {
        sqlx::query_as::<_, StoredTrade>(
            "SELECT * FROM trade_log WHERE ticker = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(ticker)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch trade log")
    }

    /// Total number of logged trades.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trade_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl TradeSink for Database {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, record: &TradeRecord) -> Result<()> {
        self.insert_record(record).await.map(|_| ())
    }
}

fn insert_sql() -> String {
    let placeholders = vec!["?"; RECORD_COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO trade_log ({}) VALUES ({})",
        RECORD_COLUMNS.join(", "),
        placeholders
    )
}
