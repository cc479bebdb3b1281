mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use macro_dashboard_digest::config::ScheduleConfig;
use macro_dashboard_digest::routes::routes;
use macro_dashboard_digest::services::cache;
use macro_dashboard_digest::services::email::DeliveryChannel;
use macro_dashboard_digest::services::scheduler::DailyScheduler;
use macro_dashboard_digest::services::subscribers::SubscriberRegistry;
use warp::http::StatusCode;

use support::{cache_in, pipeline, MockChannel, MockSource};

#[tokio::test]
async fn pipeline_run_refreshes_then_sends() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    SubscriberRegistry::new(store.clone()).add("a@example.com").unwrap();

    let source = Arc::new(MockSource::default());
    let channel = MockChannel::new("primary", 1);
    let calls = channel.calls.clone();
    let channels: Vec<Box<dyn DeliveryChannel>> = vec![Box::new(channel)];
    let pipeline = pipeline(store, source.clone(), channels);

    assert_eq!(pipeline.run().await.unwrap(), 1);
    assert_eq!(MockSource::calls(&source.macro_calls), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_runs_only_force_macro_and_bonds() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    let source = Arc::new(MockSource::default());
    let pipeline = pipeline(store, source.clone(), Vec::new());

    pipeline.run().await.unwrap();
    pipeline.run().await.unwrap();

    assert_eq!(MockSource::calls(&source.macro_calls), 2);
    assert_eq!(MockSource::calls(&source.bonds_calls), 2);
    assert_eq!(MockSource::calls(&source.stocks_calls), 1);
    assert_eq!(MockSource::calls(&source.news_calls), 1);
}

#[tokio::test]
async fn failed_refresh_skips_the_digest() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(&dir.path().join("cache"));
    SubscriberRegistry::new(store.clone()).add("a@example.com").unwrap();
    std::fs::remove_dir_all(dir.path().join("cache")).unwrap();

    let channel = MockChannel::new("primary", 1);
    let calls = channel.calls.clone();
    let pipeline = pipeline(store, Arc::new(MockSource::default()), vec![Box::new(channel)]);

    assert!(pipeline.run().await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(pipeline.warmup(0).await.is_none());
}

#[tokio::test]
async fn cron_route_reports_recipient_count() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    SubscriberRegistry::new(store.clone()).add("a@example.com").unwrap();
    let pipeline = Arc::new(pipeline(
        store,
        Arc::new(MockSource::default()),
        vec![Box::new(MockChannel::new("primary", 1))],
    ));

    let resp = warp::test::request().method("GET").path("/cron").reply(&routes(pipeline)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(resp.body().to_vec()).unwrap();
    assert!(body.starts_with("Refreshed and email sent to 1 recipients at "));
    assert!(body.ends_with("Z\n"));
}

#[tokio::test]
async fn cron_route_returns_500_when_cache_is_unwritable() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(&dir.path().join("cache"));
    std::fs::remove_dir_all(dir.path().join("cache")).unwrap();
    let pipeline = Arc::new(pipeline(store, Arc::new(MockSource::default()), Vec::new()));

    let resp = warp::test::request().method("GET").path("/cron").reply(&routes(pipeline)).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8_lossy(resp.body()).starts_with("Error: "));
}

#[tokio::test]
async fn read_api_serves_cached_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    let pipeline = Arc::new(pipeline(store, Arc::new(MockSource::default()), Vec::new()));
    pipeline.refresher().refresh_all(0).await.unwrap();
    let api = routes(pipeline);

    let resp = warp::test::request().method("GET").path("/api/v1/macro").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["US"]["policy_rate"], 5.25);
    assert!(json["EU"]["cpi_yoy"].is_null());

    let resp = warp::test::request().method("GET").path("/api/v1/nope").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscribe_route_validates_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    let api = routes(Arc::new(pipeline(store, Arc::new(MockSource::default()), Vec::new())));

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/subscribe")
        .json(&serde_json::json!({"email": "  reader@example.com "}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/subscribe")
        .json(&serde_json::json!({"email": "not-an-address"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = warp::test::request().method("GET").path("/api/v1/subscribers/count").reply(&api).await;
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn corrupt_subscriber_list_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    let truncated = r#"["old1@example.com", "old2@example.com""#;
    std::fs::write(store.path(cache::SUBSCRIBERS), truncated).unwrap();
    let api = routes(Arc::new(pipeline(store.clone(), Arc::new(MockSource::default()), Vec::new())));

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/subscribe")
        .json(&serde_json::json!({"email": "new@example.com"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Storage error"));
    assert_eq!(std::fs::read_to_string(store.path(cache::SUBSCRIBERS)).unwrap(), truncated);

    let resp = warp::test::request().method("GET").path("/api/v1/subscribers/count").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_body_and_wrong_method_map_to_client_errors() {
    let dir = tempfile::tempdir().unwrap();
    let api = routes(Arc::new(pipeline(cache_in(dir.path()), Arc::new(MockSource::default()), Vec::new())));

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/subscribe")
        .header("content-type", "application/json")
        .body("{\"mail\": 1}")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(json["error"].is_string());

    let resp = warp::test::request().method("POST").path("/api/v1/macro").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scheduler_starts_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = cache_in(dir.path());
    let pipeline = Arc::new(pipeline(store, Arc::new(MockSource::default()), Vec::new()));

    let scheduler = DailyScheduler::new(ScheduleConfig::default(), pipeline);
    assert!(scheduler.start().await.unwrap());
    assert!(!scheduler.start().await.unwrap());
    assert!(scheduler.is_running());

    scheduler.stop().await.unwrap();
    assert!(!scheduler.is_running());
}
