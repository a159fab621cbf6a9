//! Spreadsheet append over an HTTP webhook (e.g. an Apps Script web app).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::models::TradeRecord;

use super::TradeSink;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the webhook answered an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The endpoint explicitly confirmed the new row.
    Confirmed,
    /// The request went through but nothing confirms the row was written.
    Unconfirmed(String),
    /// The endpoint reported a failure.
    Rejected(String),
}

/// Classify a webhook response.
///
/// Only a 2xx status with a body that says so counts as confirmed: a JSON
/// object whose `status` or `result` is `success`/`ok`, or a bare
/// `success`/`ok` body.
pub fn interpret_response(status: StatusCode, body: &str) -> AppendOutcome {
    if !status.is_success() {
        return AppendOutcome::Rejected(format!("{} - {}", status, body.trim()));
    }

    let body = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(err) = map.get("error").filter(|e| !e.is_null()) {
            return AppendOutcome::Rejected(err.to_string());
        }
        let confirmed = ["status", "result"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .any(is_success_word);
        if confirmed {
            return AppendOutcome::Confirmed;
        }
        return AppendOutcome::Unconfirmed(body.to_string());
    }

    if is_success_word(body) {
        AppendOutcome::Confirmed
    } else if body.is_empty() {
        AppendOutcome::Unconfirmed("empty response".to_string())
    } else {
        AppendOutcome::Unconfirmed(body.to_string())
    }
}

fn is_success_word(s: &str) -> bool {
    s.eq_ignore_ascii_case("success") || s.eq_ignore_ascii_case("ok")
}

/// Appends each record as one spreadsheet row via a POSTed JSON payload:
/// `{"columns": [...], "values": [...]}`.
pub struct SheetWebhookSink {
    client: Client,
    url: String,
}

impl SheetWebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn payload(record: &TradeRecord) -> Value {
        json!({
            "columns": record.columns().collect::<Vec<_>>(),
            "values": record.to_json_row(),
        })
    }
}

#[async_trait]
impl TradeSink for SheetWebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn append(&self, record: &TradeRecord) -> Result<()> {
        debug!(url = %self.url, "Appending trade record");

        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(record))
            .send()
            .await
            .context("Failed to reach trade log webhook")?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match interpret_response(status, &body) {
            AppendOutcome::Confirmed => Ok(()),
            AppendOutcome::Unconfirmed(detail) => {
                warn!(status = %status, detail = %detail, "Trade log append not confirmed");
                anyhow::bail!("Trade log append not confirmed ({}): {}", status, detail)
            }
            AppendOutcome::Rejected(detail) => {
                anyhow::bail!("Trade log append failed: {}", detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::models::TradeInputs;
    use crate::sizing::{PositionSizer, TradeRecordBuilder};

    #[test]
    fn test_confirmed_responses() {
        assert_eq!(
            interpret_response(StatusCode::OK, r#"{"status": "success"}"#),
            AppendOutcome::Confirmed
        );
        assert_eq!(
            interpret_response(StatusCode::OK, r#"{"result":"OK","row":12}"#),
            AppendOutcome::Confirmed
        );
        assert_eq!(interpret_response(StatusCode::OK, "Success\n"), AppendOutcome::Confirmed);
    }

    #[test]
    fn test_unconfirmed_responses() {
        assert_eq!(
            interpret_response(StatusCode::OK, ""),
            AppendOutcome::Unconfirmed("empty response".to_string())
        );
        assert!(matches!(
            interpret_response(StatusCode::OK, "<html>Moved</html>"),
            AppendOutcome::Unconfirmed(_)
        ));
        assert!(matches!(
            interpret_response(StatusCode::OK, r#"{"row": 12}"#),
            AppendOutcome::Unconfirmed(_)
        ));
        assert!(matches!(
            interpret_response(StatusCode::NO_CONTENT, ""),
            AppendOutcome::Unconfirmed(_)
        ));
    }

    #[test]
    fn test_rejected_responses() {
        assert!(matches!(
            interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            AppendOutcome::Rejected(_)
        ));
        assert!(matches!(
            interpret_response(StatusCode::OK, r#"{"status":"error","error":"sheet locked"}"#),
            AppendOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_payload_is_positional() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let inputs = TradeInputs::new(dec!(100000), dec!(1), dec!(390), dec!(378)).unwrap();
        let sizing = PositionSizer::new().size(&inputs).unwrap();
        let record = TradeRecordBuilder::default().build(ts, "INFY.NS", &inputs, None, &sizing);

        let payload = SheetWebhookSink::payload(&record);
        let values = payload["values"].as_array().unwrap();
        let columns = payload["columns"].as_array().unwrap();

        assert_eq!(values.len(), columns.len());
        assert_eq!(columns[1], "ticker");
        assert_eq!(values[1], "INFY.NS");
        assert_eq!(values[11], 83);
    }
}
