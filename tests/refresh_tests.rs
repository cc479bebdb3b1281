mod support;

use std::sync::Arc;

use macro_dashboard_digest::models::{HistorySeries, Region};
use macro_dashboard_digest::services::cache::{self, CacheStore};
use macro_dashboard_digest::services::refresh::{Artifact, Refresher};

use support::{cache_in, news_item, MockSource};

fn history(year: i32, region: Region, value: f64) -> HistorySeries {
    let mut h = HistorySeries::new();
    h.set(year, region, Some(value));
    h
}

#[tokio::test]
async fn first_refresh_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let source = Arc::new(MockSource::with_history(history(2020, Region::CN, 2.1)));
    let refresher = Refresher::new(cache.clone(), source.clone());

    let report = refresher.refresh_all(60).await.unwrap();

    assert_eq!(
        report.refreshed,
        vec![Artifact::Macro, Artifact::Bonds, Artifact::Stocks, Artifact::News, Artifact::History]
    );
    for artifact in report.refreshed {
        assert!(cache.read(artifact.file_name()).unwrap().is_some(), "{} missing", artifact);
    }
}

#[tokio::test]
async fn zero_threshold_refetches_macro_and_bonds_only() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let source = Arc::new(MockSource::with_history(history(2020, Region::CN, 2.1)));
    let refresher = Refresher::new(cache, source.clone());

    refresher.refresh_all(60).await.unwrap();
    let report = refresher.refresh_all(0).await.unwrap();

    assert_eq!(report.refreshed, vec![Artifact::Macro, Artifact::Bonds]);
    assert_eq!(report.skipped, vec![Artifact::Stocks, Artifact::News, Artifact::History]);
    assert_eq!(MockSource::calls(&source.macro_calls), 2);
    assert_eq!(MockSource::calls(&source.bonds_calls), 2);
    assert_eq!(MockSource::calls(&source.stocks_calls), 1);
    assert_eq!(MockSource::calls(&source.news_calls), 1);
    assert_eq!(MockSource::calls(&source.history_calls), 1);
}

#[tokio::test]
async fn fresh_artifacts_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let source = Arc::new(MockSource::with_history(history(2020, Region::US, 1.2)));
    let refresher = Refresher::new(cache, source.clone());

    refresher.refresh_all(60).await.unwrap();
    let report = refresher.refresh_all(60).await.unwrap();

    assert!(report.refreshed.is_empty());
    assert_eq!(report.skipped.len(), 5);
    assert_eq!(MockSource::calls(&source.macro_calls), 1);
}

#[tokio::test]
async fn huge_threshold_only_skips_written_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let source = Arc::new(MockSource::with_history(history(2020, Region::EU, 0.3)));
    let refresher = Refresher::new(cache, source.clone());

    let first = refresher.refresh_all(u64::MAX / 10).await.unwrap();
    assert_eq!(first.refreshed.len(), 5);

    let second = refresher.refresh_all(u64::MAX).await.unwrap();
    assert!(second.refreshed.is_empty());
    assert_eq!(MockSource::calls(&source.macro_calls), 1);
}

#[tokio::test]
async fn history_refresh_merges_into_existing_table() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    cache.save_history(&history(2019, Region::CN, 1.8)).unwrap();
    // make the existing table stale
    std::fs::File::options()
        .write(true)
        .open(cache.path(cache::CPI_HISTORY))
        .unwrap()
        .set_modified(std::time::SystemTime::now() - std::time::Duration::from_secs(13 * 3600))
        .unwrap();

    let source = Arc::new(MockSource::with_history(history(2020, Region::CN, 2.1)));
    let refresher = Refresher::new(cache.clone(), source);
    let report = refresher.refresh_all(60).await.unwrap();
    assert!(report.refreshed.contains(&Artifact::History));

    let merged = cache.load_history();
    let years: Vec<i32> = merged.rows().iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2019, 2020]);
    assert_eq!(merged.get(2019, Region::CN), Some(1.8));
    assert_eq!(merged.get(2020, Region::CN), Some(2.1));
}

#[tokio::test]
async fn empty_history_fetch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let source = Arc::new(MockSource::default());
    let refresher = Refresher::new(cache.clone(), source);

    let report = refresher.refresh_all(60).await.unwrap();

    assert!(!report.refreshed.contains(&Artifact::History));
    assert!(cache.read(cache::CPI_HISTORY).unwrap().is_none());
}

#[tokio::test]
async fn stored_snapshots_keep_every_region_key_with_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let refresher = Refresher::new(cache.clone(), Arc::new(MockSource::default()));
    refresher.refresh_all(0).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&cache.read(cache::MACRO_SNAPSHOT).unwrap().unwrap()).unwrap();
    for region in ["CN", "US", "EU"] {
        let record = raw[region].as_object().unwrap();
        for field in ["gdp_yoy", "cpi_yoy", "ppi_yoy", "policy_rate"] {
            assert!(record.contains_key(field), "{region}.{field} missing");
        }
    }
    assert!(raw["CN"]["gdp_yoy"].is_null());
    assert_eq!(raw["US"]["gdp_yoy"], 2.5);

    let bonds: serde_json::Value =
        serde_json::from_str(&cache.read(cache::BONDS_SNAPSHOT).unwrap().unwrap()).unwrap();
    assert!(bonds["EU"]["1y"]["value"].is_null());
}

#[tokio::test]
async fn news_limit_is_passed_to_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let source = Arc::new(MockSource {
        news: (0..5).map(|i| news_item("ECB", &format!("t{i}"))).collect(),
        ..Default::default()
    });
    let refresher = Refresher::new(cache.clone(), source).with_news_limit(3);
    refresher.refresh_all(0).await.unwrap();

    let stored: Vec<macro_dashboard_digest::models::NewsItem> =
        cache.load_json(cache::NEWS_ITEMS).unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn cache_write_failure_fails_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(CacheStore::new(dir.path().join("gone")).unwrap());
    std::fs::remove_dir_all(dir.path().join("gone")).unwrap();

    let refresher = Refresher::new(cache, Arc::new(MockSource::default()));
    assert!(refresher.refresh_all(0).await.is_err());
}
