// src/services/refresh.rs
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use super::cache::{self, CacheStore};
use super::news::DEFAULT_NEWS_LIMIT;
use super::sources::MarketDataSource;
use super::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Artifact {
    Macro,
    Bonds,
    Stocks,
    News,
    History,
}

impl Artifact {
    pub fn file_name(&self) -> &'static str {
        match self {
            Artifact::Macro => cache::MACRO_SNAPSHOT,
            Artifact::Bonds => cache::BONDS_SNAPSHOT,
            Artifact::Stocks => cache::STOCKS_SNAPSHOT,
            Artifact::News => cache::NEWS_ITEMS,
            Artifact::History => cache::CPI_HISTORY,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Artifact::Macro => "macro",
            Artifact::Bonds => "bonds",
            Artifact::Stocks => "stocks",
            Artifact::News => "news",
            Artifact::History => "history",
        };
        write!(f, "{}", name)
    }
}

/// Where an artifact's staleness threshold comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// The minutes passed to `refresh_all`.
    Caller,
    FixedMinutes(u64),
}

/// Refresh order and per-artifact thresholds. Fast-moving data keeps its own
/// cadence whatever the caller asks for.
pub const REFRESH_POLICY: [(Artifact, Threshold); 5] = [
    (Artifact::Macro, Threshold::Caller),
    (Artifact::Bonds, Threshold::Caller),
    (Artifact::Stocks, Threshold::FixedMinutes(20)),
    (Artifact::News, Threshold::FixedMinutes(30)),
    (Artifact::History, Threshold::FixedMinutes(720)),
];

pub fn threshold_minutes(threshold: Threshold, caller_minutes: u64) -> u64 {
    match threshold {
        Threshold::Caller => caller_minutes,
        Threshold::FixedMinutes(minutes) => minutes,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<Artifact>,
    pub skipped: Vec<Artifact>,
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let join = |items: &[Artifact]| {
            items.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
        };
        write!(f, "refreshed [{}], fresh [{}]", join(&self.refreshed), join(&self.skipped))
    }
}

pub struct Refresher {
    cache: Arc<CacheStore>,
    sources: Arc<dyn MarketDataSource>,
    news_limit: usize,
}

impl Refresher {
    pub fn new(cache: Arc<CacheStore>, sources: Arc<dyn MarketDataSource>) -> Self {
        Self {
            cache,
            sources,
            news_limit: DEFAULT_NEWS_LIMIT,
        }
    }

    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit;
        self
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Re-fetches every artifact older than its threshold. Macro and bonds use
    /// `force_if_stale_minutes`; zero forces them. Provider failures never
    /// fail the pass, cache write failures do.
    pub async fn refresh_all(&self, force_if_stale_minutes: u64) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();

        for (artifact, threshold) in REFRESH_POLICY {
            let minutes = threshold_minutes(threshold, force_if_stale_minutes);
            let max_age = Duration::from_secs(minutes.saturating_mul(60));

            if !self.cache.is_stale(artifact.file_name(), max_age) {
                report.skipped.push(artifact);
                continue;
            }

            info!("Refreshing {} (older than {} minutes)", artifact, minutes);
            if self.refresh(artifact).await? {
                report.refreshed.push(artifact);
            }
        }

        info!("Refresh pass done: {}", report);
        Ok(report)
    }

    /// Returns whether anything was written.
    async fn refresh(&self, artifact: Artifact) -> Result<bool> {
        match artifact {
            Artifact::Macro => {
                let snapshot = self.sources.fetch_macro().await;
                self.cache.save_json(cache::MACRO_SNAPSHOT, &snapshot)?;
            }
            Artifact::Bonds => {
                let snapshot = self.sources.fetch_bonds().await;
                self.cache.save_json(cache::BONDS_SNAPSHOT, &snapshot)?;
            }
            Artifact::Stocks => {
                let snapshot = self.sources.fetch_stocks().await;
                self.cache.save_json(cache::STOCKS_SNAPSHOT, &snapshot)?;
            }
            Artifact::News => {
                let items = self.sources.fetch_news(self.news_limit).await;
                self.cache.save_json(cache::NEWS_ITEMS, &items)?;
            }
            Artifact::History => {
                let fetched = self.sources.fetch_cpi_history().await;
                if fetched.is_empty() {
                    warn!("No CPI history fetched, keeping the existing table");
                    return Ok(false);
                }
                let mut history = self.cache.load_history();
                history.merge(fetched);
                self.cache.save_history(&history)?;
            }
        }
        Ok(true)
    }
}
