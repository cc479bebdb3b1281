//src/services/stocks.rs
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::models::{IndexQuote, MarketSlot, Region, StocksSnapshot};
use super::Result;

/// Index tickers shown for each region, in slot order.
pub const TICKERS: [(Region, [(MarketSlot, &str); 2]); 3] = [
    (Region::CN, [(MarketSlot::Mkt1, "000001.SS"), (MarketSlot::Mkt2, "399001.SZ")]),
    (Region::US, [(MarketSlot::Mkt1, "^GSPC"), (MarketSlot::Mkt2, "^IXIC")]),
    (Region::EU, [(MarketSlot::Mkt1, "^FTSE"), (MarketSlot::Mkt2, "^GDAXI")]),
];

/// Daily closes over the last five sessions from the Yahoo chart API, oldest
/// first, with missing sessions dropped.
pub async fn fetch_daily_closes(client: &Client, symbol: &str) -> Result<Vec<f64>> {
    let url = format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{}?range=5d&interval=1d",
        symbol.replace('^', "%5E")
    );
    info!("Fetching daily closes for {}", symbol);

    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;
    parse_closes(&body)
}

pub fn parse_closes(body: &Value) -> Result<Vec<f64>> {
    let closes = body
        .pointer("/chart/result/0/indicators/quote/0/close")
        .and_then(|c| c.as_array())
        .ok_or("Close prices not found in chart response")?;
    Ok(closes.iter().filter_map(|c| c.as_f64()).collect())
}

/// Level and percentage change from the last two closes.
pub fn quote_from_closes(closes: &[f64]) -> IndexQuote {
    match closes {
        [.., prev, last] => IndexQuote {
            level: Some(*last),
            change_pct: if *prev != 0.0 { Some((last / prev - 1.0) * 100.0) } else { None },
        },
        _ => IndexQuote::default(),
    }
}

pub async fn fetch_stocks_snapshot(client: &Client) -> StocksSnapshot {
    let mut snapshot = StocksSnapshot::default();

    for (region, slots) in TICKERS {
        for (slot, symbol) in slots {
            let quote = match fetch_daily_closes(client, symbol).await {
                Ok(closes) => {
                    if closes.len() < 2 {
                        warn!("Only {} close(s) available for {}", closes.len(), symbol);
                    }
                    quote_from_closes(&closes)
                }
                Err(e) => {
                    warn!("Failed to fetch {}: {}", symbol, e);
                    IndexQuote::default()
                }
            };
            *snapshot.get_mut(region).get_mut(slot) = quote;
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn change_is_computed_from_last_two_closes() {
        let quote = quote_from_closes(&[90.0, 100.0, 102.0]);
        assert_eq!(quote.level, Some(102.0));
        let change = quote.change_pct.unwrap();
        assert!((change - 2.0).abs() < 1e-9);
    }

    #[test]
    fn fewer_than_two_closes_is_a_null_record() {
        assert_eq!(quote_from_closes(&[4500.0]), IndexQuote::default());
        assert_eq!(quote_from_closes(&[]), IndexQuote::default());
    }

    #[test]
    fn parse_closes_skips_missing_sessions() {
        let body = json!({
            "chart": {"result": [{"indicators": {"quote": [{"close": [1.0, null, 3.0]}]}}]}
        });
        assert_eq!(parse_closes(&body).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn parse_closes_rejects_error_payload() {
        let body = json!({"chart": {"result": null, "error": {"code": "Not Found"}}});
        assert!(parse_closes(&body).is_err());
    }
}
