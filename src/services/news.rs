// src/services/news.rs
use std::collections::HashSet;
use std::sync::Arc;

use feed_rs::model::Entry;
use feed_rs::parser;
use log::{info, warn};
use reqwest::Client;
use scraper::Html;

use crate::models::NewsItem;
use super::translate::TextTranslator;
use super::Result;

pub const DEFAULT_NEWS_LIMIT: usize = 30;
pub const ENTRIES_PER_FEED: usize = 10;
pub const SUMMARY_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct NewsFeed {
    pub source: &'static str,
    pub url: &'static str,
    /// Already in the digest language; never translated.
    pub native: bool,
}

pub const FEEDS: &[NewsFeed] = &[
    NewsFeed { source: "Xinhua", url: "http://www.xinhuanet.com/english/rss/businessrss.xml", native: true },
    NewsFeed { source: "Reuters", url: "https://feeds.reuters.com/reuters/businessNews", native: false },
    NewsFeed { source: "PBOC", url: "http://www.pbc.gov.cn/english/130721/rss.xml", native: true },
    NewsFeed { source: "NBS", url: "http://www.stats.gov.cn/english/rss.xml", native: true },
    NewsFeed { source: "ECB", url: "https://www.ecb.europa.eu/press/press.rss", native: false },
    NewsFeed { source: "FED", url: "https://www.federalreserve.gov/feeds/press_all.xml", native: false },
];

pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Feed summaries are frequently HTML fragments.
pub fn strip_html(fragment: &str) -> String {
    if !fragment.contains('<') {
        return fragment.trim().to_string();
    }
    let doc = Html::parse_fragment(fragment);
    let text: Vec<&str> = doc.root_element().text().collect();
    text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn entry_to_item(source: &str, entry: Entry) -> NewsItem {
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let summary = entry
        .summary
        .map(|s| strip_html(&s.content))
        .unwrap_or_default();
    let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();
    let pub_time = entry
        .published
        .or(entry.updated)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();

    NewsItem {
        source: source.to_string(),
        title: title.trim().to_string(),
        summary: truncate_chars(&summary, SUMMARY_MAX_CHARS),
        link,
        pub_time,
    }
}

/// Parses a feed body into at most [`ENTRIES_PER_FEED`] untranslated items.
pub fn parse_feed(source: &str, body: &[u8]) -> Result<Vec<NewsItem>> {
    let feed = parser::parse(body).map_err(|e| format!("Feed parse error for {}: {}", source, e))?;
    Ok(feed
        .entries
        .into_iter()
        .take(ENTRIES_PER_FEED)
        .map(|entry| entry_to_item(source, entry))
        .collect())
}

/// Drops empty titles and repeated titles (exact match, first one wins), then
/// keeps the first `limit` items.
pub fn dedupe_by_title(items: Vec<NewsItem>, limit: usize) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.title.is_empty() && seen.insert(item.title.clone()))
        .take(limit)
        .collect()
}

pub struct NewsFetcher {
    client: Client,
    translator: Arc<dyn TextTranslator>,
}

impl NewsFetcher {
    pub fn new(client: Client, translator: Arc<dyn TextTranslator>) -> Self {
        Self { client, translator }
    }

    async fn fetch_feed(&self, feed: &NewsFeed) -> Result<Vec<NewsItem>> {
        let response = self.client.get(feed.url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Failed to fetch feed: HTTP {}", response.status()).into());
        }
        let bytes = response.bytes().await?;
        parse_feed(feed.source, &bytes[..])
    }

    /// Translates title and (already truncated) summary unless the feed is
    /// native.
    pub async fn localize(&self, feed: &NewsFeed, mut item: NewsItem) -> NewsItem {
        if !feed.native {
            item.title = self.translator.translate(&item.title).await;
            item.summary = self.translator.translate(&item.summary).await;
        }
        item
    }

    /// Walks `feeds` in order; a feed that fails is skipped.
    pub async fn fetch_from(&self, feeds: &[NewsFeed], limit: usize) -> Vec<NewsItem> {
        let mut items = Vec::new();

        for feed in feeds {
            match self.fetch_feed(feed).await {
                Ok(entries) => {
                    info!("Fetched {} entries from {}", entries.len(), feed.source);
                    for item in entries {
                        items.push(self.localize(feed, item).await);
                    }
                }
                Err(e) => warn!("Skipping feed {}: {}", feed.source, e),
            }
        }

        dedupe_by_title(items, limit)
    }

    pub async fn fetch_news_items(&self, limit: usize) -> Vec<NewsItem> {
        self.fetch_from(FEEDS, limit).await
    }
}
