// src/handlers/dashboard.rs
use std::sync::Arc;

use log::debug;
use warp::reply::Json;
use warp::Rejection;

use crate::models::{BondsSnapshot, MacroSnapshot, NewsItem, StocksSnapshot};
use crate::services::cache::{self, CacheStore};

// Read-only views of the cache for the dashboard. These never call a
// provider; a missing artifact is served as its empty shape.

pub async fn get_macro(store: Arc<CacheStore>) -> Result<Json, Rejection> {
    debug!("Serving cached macro snapshot");
    let snapshot: MacroSnapshot = store.load_json(cache::MACRO_SNAPSHOT).unwrap_or_default();
    Ok(warp::reply::json(&snapshot))
}

pub async fn get_bonds(store: Arc<CacheStore>) -> Result<Json, Rejection> {
    debug!("Serving cached bonds snapshot");
    let snapshot: BondsSnapshot = store.load_json(cache::BONDS_SNAPSHOT).unwrap_or_default();
    Ok(warp::reply::json(&snapshot))
}

pub async fn get_stocks(store: Arc<CacheStore>) -> Result<Json, Rejection> {
    debug!("Serving cached stocks snapshot");
    let snapshot: StocksSnapshot = store.load_json(cache::STOCKS_SNAPSHOT).unwrap_or_default();
    Ok(warp::reply::json(&snapshot))
}

pub async fn get_news(store: Arc<CacheStore>) -> Result<Json, Rejection> {
    debug!("Serving cached news items");
    let items: Vec<NewsItem> = store.load_json(cache::NEWS_ITEMS).unwrap_or_default();
    Ok(warp::reply::json(&items))
}

pub async fn get_history(store: Arc<CacheStore>) -> Result<Json, Rejection> {
    debug!("Serving cached CPI history");
    Ok(warp::reply::json(&store.load_history().rows()))
}
