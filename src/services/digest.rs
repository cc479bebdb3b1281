// src/services/digest.rs
use chrono::{DateTime, Utc};
use html_escape::{encode_single_quoted_attribute, encode_text};

use crate::models::{
    BondsSnapshot, HistorySeries, MacroRecord, MacroSnapshot, MarketSlot, NewsItem, Region,
    StocksSnapshot, Tenor,
};
use super::cache::{self, CacheStore};

pub const SUBJECT: &str = "Daily Macro & Markets Digest";
pub const PLACEHOLDER: &str = "—";
pub const MAX_HEADLINES: usize = 8;

/// Cached state the digest is built from. Missing artifacts load as empty.
#[derive(Debug, Clone, Default)]
pub struct DigestInputs {
    pub macro_snapshot: MacroSnapshot,
    pub bonds: BondsSnapshot,
    pub stocks: StocksSnapshot,
    pub news: Vec<NewsItem>,
    pub history: HistorySeries,
}

impl DigestInputs {
    pub fn from_cache(store: &CacheStore) -> Self {
        DigestInputs {
            macro_snapshot: store.load_json(cache::MACRO_SNAPSHOT).unwrap_or_default(),
            bonds: store.load_json(cache::BONDS_SNAPSHOT).unwrap_or_default(),
            stocks: store.load_json(cache::STOCKS_SNAPSHOT).unwrap_or_default(),
            news: store.load_json(cache::NEWS_ITEMS).unwrap_or_default(),
            history: store.load_history(),
        }
    }
}

pub fn fmt_value(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn pct_fmt(value: Option<f64>) -> String {
    value.map(|v| format!("{:+.2}%", v)).unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn bp_fmt(value: Option<f64>) -> String {
    value.map(|v| format!("{:+.0}bp", v)).unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn macro_line(region: Region, record: &MacroRecord) -> String {
    format!(
        "<b>{}</b> GDP:{} CPI:{} PPI:{} Rate:{}",
        region.display_name(),
        fmt_value(record.gdp_yoy),
        fmt_value(record.cpi_yoy),
        fmt_value(record.ppi_yoy),
        fmt_value(record.policy_rate),
    )
}

fn markets_line(region: Region, inputs: &DigestInputs) -> String {
    let curve = inputs.bonds.get(region);
    let yields: Vec<String> = Tenor::ALL
        .iter()
        .map(|t| {
            let quote = curve.get(*t);
            format!("{} {} ({})", t.label(), fmt_value(quote.value), bp_fmt(quote.change_bp))
        })
        .collect();

    let slots = inputs.stocks.get(region);
    let indices: Vec<String> = MarketSlot::ALL
        .iter()
        .map(|s| {
            let quote = slots.get(*s);
            format!("{} ({})", fmt_value(quote.level), pct_fmt(quote.change_pct))
        })
        .collect();

    format!(
        "<b>{}</b> Yields: {} | Indices: {}",
        region.display_name(),
        yields.join(", "),
        indices.join(", ")
    )
}

fn headline(item: &NewsItem) -> String {
    let href = if item.link.is_empty() { "#" } else { item.link.as_str() };
    format!(
        "<li>{}: <a href='{}'>{}</a></li>",
        encode_text(&item.source),
        encode_single_quoted_attribute(href),
        encode_text(&item.title)
    )
}

/// HTML body of the daily email: one line per region, up to
/// [`MAX_HEADLINES`] headlines, and the send time in UTC.
pub fn render_digest(inputs: &DigestInputs, sent_at: DateTime<Utc>) -> String {
    let macro_lines: Vec<String> = inputs
        .macro_snapshot
        .iter()
        .map(|(region, record)| macro_line(region, record))
        .collect();
    let market_lines: Vec<String> = Region::ALL
        .iter()
        .map(|r| markets_line(*r, inputs))
        .collect();
    let headlines: String = inputs.news.iter().take(MAX_HEADLINES).map(headline).collect();

    let mut html = format!("<h3>{}</h3>", SUBJECT);
    html.push_str(&format!("<p>{}</p>", macro_lines.join("<br>")));
    html.push_str(&format!("<h4>Markets</h4><p>{}</p>", market_lines.join("<br>")));
    html.push_str(&format!("<h4>News</h4><ul>{}</ul>", headlines));
    if let Some(year) = inputs.history.latest_year() {
        html.push_str(&format!("<p>CPI history through {}</p>", year));
    }
    html.push_str(&format!(
        "<p style='color:#888;'>Sent at: {}Z</p>",
        sent_at.format("%Y-%m-%dT%H:%M:%S")
    ));
    html
}
