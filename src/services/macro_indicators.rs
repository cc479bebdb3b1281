// src/services/macro_indicators.rs
use std::fmt::Display;

use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::models::{HistorySeries, MacroRecord, MacroSnapshot, Region};
use super::trading_economics::{latest_value, TradingEconomics};
use super::Result;

pub const GDP_GROWTH_SERIES: &str = "NY.GDP.MKTP.KD.ZG";
pub const CPI_GROWTH_SERIES: &str = "FP.CPI.TOTL.ZG";

const SNAPSHOT_PERIODS: u32 = 5;
const HISTORY_PERIODS: u32 = 200;

/// Fetch one World Bank indicator series for a region.
async fn fetch_world_bank(client: &Client, series: &str, region: Region, per_page: u32) -> Result<Value> {
    let url = format!(
        "https://api.worldbank.org/v2/country/{}/indicator/{}?format=json&per_page={}",
        region.world_bank_code(),
        series,
        per_page
    );
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;
    Ok(body)
}

/// World Bank responses are `[paging, [observation, ...]]`.
fn observations(body: &Value) -> Result<&Vec<Value>> {
    body.as_array()
        .filter(|parts| parts.len() >= 2)
        .and_then(|parts| parts[1].as_array())
        .ok_or_else(|| "Unexpected World Bank response shape".into())
}

/// Latest non-null observation, chosen by the largest period label.
pub fn latest_observation(body: &Value) -> Result<Option<(f64, String)>> {
    let latest = observations(body)?
        .iter()
        .filter_map(|obs| {
            let value = obs.get("value")?.as_f64()?;
            let date = obs.get("date")?.as_str()?;
            Some((value, date.to_string()))
        })
        .max_by(|a, b| a.1.cmp(&b.1));
    Ok(latest)
}

/// Every `(year, value)` pair in a World Bank response; null values are kept.
pub fn yearly_observations(body: &Value) -> Result<Vec<(i32, Option<f64>)>> {
    let mut out = Vec::new();
    for obs in observations(body)? {
        let year = obs
            .get("date")
            .and_then(|d| d.as_str())
            .ok_or("Observation without a date")?
            .trim()
            .parse::<i32>()?;
        out.push((year, obs.get("value").and_then(|v| v.as_f64())));
    }
    Ok(out)
}

fn or_null<E: Display>(what: &str, region: Region, result: std::result::Result<Option<f64>, E>) -> Option<f64> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{} for {} unavailable: {}", what, region.code(), e);
            None
        }
    }
}

async fn world_bank_latest(client: &Client, series: &str, region: Region) -> Result<Option<f64>> {
    let body = fetch_world_bank(client, series, region, SNAPSHOT_PERIODS).await?;
    Ok(latest_observation(&body)?.map(|(value, _)| value))
}

async fn ppi(te: &TradingEconomics, region: Region) -> Result<Option<f64>> {
    let rows = te.get("indicators/ppi", &[("country", region.code())]).await?;
    Ok(latest_value(&rows))
}

async fn policy_rate(te: &TradingEconomics, region: Region) -> Result<Option<f64>> {
    let rows = match region {
        Region::US => te.get("federal_funds_rate", &[]).await?,
        other => te.get(&format!("policy_rate/{}", other.code()), &[]).await?,
    };
    Ok(latest_value(&rows))
}

/// GDP and CPI growth from the World Bank, PPI and policy rate from Trading
/// Economics. Each field fails on its own.
pub async fn fetch_macro_snapshot(client: &Client, te: &TradingEconomics) -> MacroSnapshot {
    let mut snapshot = MacroSnapshot::default();

    for region in Region::ALL {
        let record = MacroRecord {
            gdp_yoy: or_null("GDP growth", region, world_bank_latest(client, GDP_GROWTH_SERIES, region).await),
            cpi_yoy: or_null("CPI growth", region, world_bank_latest(client, CPI_GROWTH_SERIES, region).await),
            ppi_yoy: or_null("PPI", region, ppi(te, region).await),
            policy_rate: or_null("Policy rate", region, policy_rate(te, region).await),
        };
        info!("Macro snapshot for {}: {:?}", region.code(), record);
        *snapshot.get_mut(region) = record;
    }

    snapshot
}

/// Long yearly CPI series for every region. Regions that fail are left out of
/// the returned table.
pub async fn fetch_cpi_history(client: &Client) -> HistorySeries {
    let mut history = HistorySeries::new();

    for region in Region::ALL {
        let result = match fetch_world_bank(client, CPI_GROWTH_SERIES, region, HISTORY_PERIODS).await {
            Ok(body) => yearly_observations(&body),
            Err(e) => Err(e),
        };
        match result {
            Ok(points) => {
                info!("Fetched {} CPI history points for {}", points.len(), region.code());
                for (year, value) in points {
                    history.set(year, region, value);
                }
            }
            Err(e) => warn!("CPI history for {} unavailable: {}", region.code(), e),
        }
    }

    history
}
