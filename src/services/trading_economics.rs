// src/services/trading_economics.rs
use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::config::TradingEconomicsConfig;
use super::Result;

const BASE_URL: &str = "https://api.tradingeconomics.com";
const TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Clone)]
pub struct TradingEconomics {
    client: Client,
    config: Option<TradingEconomicsConfig>,
}

impl TradingEconomics {
    pub fn new(client: Client, config: Option<TradingEconomicsConfig>) -> Self {
        Self { client, config }
    }

    /// GET `{BASE_URL}/{path}` with the client credentials appended. Fails up
    /// front when no credentials are configured.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let config = self
            .config
            .as_ref()
            .ok_or("Trading Economics API keys not provided")?;

        let url = format!("{}/{}", BASE_URL, path);
        debug!("Fetching Trading Economics {}", path);

        let value = self
            .client
            .get(&url)
            .query(params)
            .query(&[
                ("client", config.client_key.as_str()),
                ("secret", config.client_secret.as_str()),
                ("format", "json"),
            ])
            .timeout(TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(value)
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Most recently reported value of an indicator series. Rows carrying a
/// `LatestValueDate` are ranked by it; otherwise the first row wins.
pub fn latest_value(rows: &Value) -> Option<f64> {
    let rows = rows.as_array()?;

    let dated = rows
        .iter()
        .filter_map(|row| row.get("LatestValueDate").and_then(|d| d.as_str()).map(|d| (d, row)))
        .max_by(|a, b| a.0.cmp(b.0))
        .map(|(_, row)| row);

    let row = dated.or_else(|| rows.first())?;
    row.get("LatestValue")
        .and_then(number)
        .or_else(|| row.get("Value").and_then(number))
}

pub fn field_f64(row: &Value, key: &str) -> Option<f64> {
    row.get(key).and_then(number)
}
