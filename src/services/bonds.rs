// src/services/bonds.rs
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::models::{BondCurve, BondQuote, BondsSnapshot, Region, Tenor};
use super::stocks::fetch_daily_closes;
use super::trading_economics::{field_f64, TradingEconomics};

fn country_name(region: Region) -> &'static str {
    match region {
        Region::US => "United States",
        Region::CN => "China",
        // Bunds stand in for the euro area curve
        Region::EU => "Germany",
    }
}

fn tenor_group(tenor: Tenor) -> &'static str {
    match tenor {
        Tenor::Y1 => "1Y",
        Tenor::Y5 => "5Y",
        Tenor::Y10 => "10Y",
    }
}

/// Picks each tracked country/tenor out of the cross-country yield table.
/// Cells without a matching row stay null.
pub fn snapshot_from_table(rows: &[Value]) -> BondsSnapshot {
    let mut snapshot = BondsSnapshot::default();

    for region in Region::ALL {
        let curve = snapshot.get_mut(region);
        for tenor in Tenor::ALL {
            let matched = rows.iter().find(|row| {
                row.get("Country").and_then(|c| c.as_str()) == Some(country_name(region))
                    && row.get("Group").and_then(|g| g.as_str()) == Some(tenor_group(tenor))
            });
            if let Some(row) = matched {
                *curve.get_mut(tenor) = BondQuote {
                    value: field_f64(row, "Last"),
                    change_bp: field_f64(row, "DailyChange").map(|c| c * 100.0),
                };
            }
        }
    }

    snapshot
}

/// Yield proxies quote ten times the yield. Needs two sessions.
pub fn proxy_quote(closes: &[f64]) -> BondQuote {
    match closes {
        [.., prev, last] => {
            let last = last / 10.0;
            let prev = prev / 10.0;
            BondQuote { value: Some(last), change_bp: Some((last - prev) * 100.0) }
        }
        _ => BondQuote::default(),
    }
}

/// US-only approximation used when the yield table is unreachable: `^FVX`
/// for 5y and `^TNX` for 10y. Everything else stays null.
async fn fallback_snapshot(client: &Client) -> BondsSnapshot {
    let mut snapshot = BondsSnapshot::default();
    let mut us = BondCurve::default();

    for (tenor, symbol) in [(Tenor::Y10, "^TNX"), (Tenor::Y5, "^FVX")] {
        match fetch_daily_closes(client, symbol).await {
            Ok(closes) => *us.get_mut(tenor) = proxy_quote(&closes),
            Err(e) => warn!("Fallback yield proxy {} unavailable: {}", symbol, e),
        }
    }

    snapshot.us = us;
    snapshot
}

pub async fn fetch_bonds_snapshot(client: &Client, te: &TradingEconomics) -> BondsSnapshot {
    let table = match te.get("bonds/major", &[]).await {
        Ok(value) => value
            .as_array()
            .cloned()
            .ok_or_else(|| "Unexpected bonds table shape".to_string()),
        Err(e) => Err(e.to_string()),
    };

    match table {
        Ok(rows) => {
            info!("Fetched {} rows from the bonds table", rows.len());
            snapshot_from_table(&rows)
        }
        Err(e) => {
            warn!("Bonds table unavailable ({}), falling back to yield proxies", e);
            fallback_snapshot(client).await
        }
    }
}
