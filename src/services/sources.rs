// src/services/sources.rs
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::Config;
use crate::models::{BondsSnapshot, HistorySeries, MacroSnapshot, NewsItem, StocksSnapshot};
use super::news::NewsFetcher;
use super::trading_economics::TradingEconomics;
use super::translate::DeepLTranslator;
use super::{bonds, macro_indicators, stocks};

/// Everything the refresh pass pulls from the outside world. Implementations
/// never fail: unreachable data comes back as null fields or empty lists.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_macro(&self) -> MacroSnapshot;
    async fn fetch_bonds(&self) -> BondsSnapshot;
    async fn fetch_stocks(&self) -> StocksSnapshot;
    async fn fetch_news(&self, limit: usize) -> Vec<NewsItem>;
    async fn fetch_cpi_history(&self) -> HistorySeries;
}

/// The real providers: World Bank, Trading Economics, Yahoo, RSS feeds.
pub struct LiveSources {
    client: Client,
    trading_economics: TradingEconomics,
    news: NewsFetcher,
}

impl LiveSources {
    pub fn new(client: Client, config: &Config) -> Self {
        let trading_economics = TradingEconomics::new(client.clone(), config.trading_economics.clone());
        let translator = Arc::new(DeepLTranslator::new(client.clone(), config.translation.clone()));
        Self {
            news: NewsFetcher::new(client.clone(), translator),
            trading_economics,
            client,
        }
    }
}

#[async_trait]
impl MarketDataSource for LiveSources {
    async fn fetch_macro(&self) -> MacroSnapshot {
        macro_indicators::fetch_macro_snapshot(&self.client, &self.trading_economics).await
    }

    async fn fetch_bonds(&self) -> BondsSnapshot {
        bonds::fetch_bonds_snapshot(&self.client, &self.trading_economics).await
    }

    async fn fetch_stocks(&self) -> StocksSnapshot {
        stocks::fetch_stocks_snapshot(&self.client).await
    }

    async fn fetch_news(&self, limit: usize) -> Vec<NewsItem> {
        self.news.fetch_news_items(limit).await
    }

    async fn fetch_cpi_history(&self) -> HistorySeries {
        macro_indicators::fetch_cpi_history(&self.client).await
    }
}
