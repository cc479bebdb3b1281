#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use macro_dashboard_digest::models::{
    BondsSnapshot, HistorySeries, MacroRecord, MacroSnapshot, NewsItem, Region, StocksSnapshot,
};
use macro_dashboard_digest::services::cache::CacheStore;
use macro_dashboard_digest::services::email::DeliveryChannel;
use macro_dashboard_digest::services::notifier::Notifier;
use macro_dashboard_digest::services::pipeline::DigestPipeline;
use macro_dashboard_digest::services::refresh::Refresher;
use macro_dashboard_digest::services::sources::MarketDataSource;
use macro_dashboard_digest::services::subscribers::SubscriberRegistry;

/// Canned provider data with per-artifact call counters.
#[derive(Default)]
pub struct MockSource {
    pub macro_calls: AtomicUsize,
    pub bonds_calls: AtomicUsize,
    pub stocks_calls: AtomicUsize,
    pub news_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub news: Vec<NewsItem>,
    pub history: HistorySeries,
}

impl MockSource {
    pub fn with_history(history: HistorySeries) -> Self {
        Self { history, ..Default::default() }
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockSource {
    async fn fetch_macro(&self) -> MacroSnapshot {
        self.macro_calls.fetch_add(1, Ordering::SeqCst);
        let mut snapshot = MacroSnapshot::default();
        *snapshot.get_mut(Region::US) = MacroRecord {
            gdp_yoy: Some(2.5),
            cpi_yoy: Some(3.1),
            ppi_yoy: None,
            policy_rate: Some(5.25),
        };
        snapshot
    }

    async fn fetch_bonds(&self) -> BondsSnapshot {
        self.bonds_calls.fetch_add(1, Ordering::SeqCst);
        BondsSnapshot::default()
    }

    async fn fetch_stocks(&self) -> StocksSnapshot {
        self.stocks_calls.fetch_add(1, Ordering::SeqCst);
        StocksSnapshot::default()
    }

    async fn fetch_news(&self, limit: usize) -> Vec<NewsItem> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        self.news.iter().take(limit).cloned().collect()
    }

    async fn fetch_cpi_history(&self) -> HistorySeries {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history.clone()
    }
}

/// Delivery channel that reports a fixed count and records what it was asked
/// to send.
pub struct MockChannel {
    pub name: &'static str,
    pub reply: usize,
    pub calls: Arc<AtomicUsize>,
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl MockChannel {
    pub fn new(name: &'static str, reply: usize) -> Self {
        Self {
            name,
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            bodies: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl DeliveryChannel for MockChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn send(&self, recipients: &[String], _subject: &str, html_body: &str) -> usize {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(html_body.to_string());
        self.reply.min(recipients.len())
    }
}

pub fn cache_in(dir: &Path) -> Arc<CacheStore> {
    Arc::new(CacheStore::new(dir).unwrap())
}

pub fn news_item(source: &str, title: &str) -> NewsItem {
    NewsItem {
        source: source.to_string(),
        title: title.to_string(),
        summary: String::new(),
        link: format!("https://example.com/{}", title.replace(' ', "-")),
        pub_time: "2024-05-01 08:00:00".to_string(),
    }
}

pub fn pipeline(
    cache: Arc<CacheStore>,
    source: Arc<MockSource>,
    channels: Vec<Box<dyn DeliveryChannel>>,
) -> DigestPipeline {
    let refresher = Refresher::new(cache.clone(), source);
    let notifier = Notifier::new(cache.clone(), SubscriberRegistry::new(cache), channels);
    DigestPipeline::new(refresher, notifier)
}
