// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::{cron::run_cron, dashboard, subscribe};
use crate::services::cache::CacheStore;
use crate::services::pipeline::DigestPipeline;
use crate::services::subscribers::SubscriberRegistry;
use log::{error, info};
use warp::http::StatusCode;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

/// Maps a rejection to the API error it should be reported as.
fn api_error_for(err: &Rejection) -> ApiError {
    if err.is_not_found() {
        ApiError::new(StatusCode::NOT_FOUND, "Not Found")
    } else if let Some(api_error) = err.find::<ApiError>() {
        api_error.clone()
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::bad_request(e)
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        error!("Unhandled rejection: {:?}", err);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let api_error = api_error_for(&err);
    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": api_error.message })),
        api_error.status,
    ))
}

pub fn routes(pipeline: Arc<DigestPipeline>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let cache: Arc<CacheStore> = pipeline.cache().clone();
    let registry = SubscriberRegistry::new(cache.clone());

    let pipeline_filter = warp::any().map(move || pipeline.clone());
    let cache_filter = warp::any().map(move || cache.clone());
    let registry_filter = warp::any().map(move || registry.clone());

    let cron_route = warp::path!("cron")
        .and(warp::get())
        .and(pipeline_filter)
        .and_then(run_cron);

    let macro_route = warp::path!("api" / "v1" / "macro")
        .and(warp::get())
        .and(cache_filter.clone())
        .and_then(dashboard::get_macro);

    let bonds_route = warp::path!("api" / "v1" / "bonds")
        .and(warp::get())
        .and(cache_filter.clone())
        .and_then(dashboard::get_bonds);

    let stocks_route = warp::path!("api" / "v1" / "stocks")
        .and(warp::get())
        .and(cache_filter.clone())
        .and_then(dashboard::get_stocks);

    let news_route = warp::path!("api" / "v1" / "news")
        .and(warp::get())
        .and(cache_filter.clone())
        .and_then(dashboard::get_news);

    let history_route = warp::path!("api" / "v1" / "history")
        .and(warp::get())
        .and(cache_filter)
        .and_then(dashboard::get_history);

    let subscribe_route = warp::path!("api" / "v1" / "subscribe")
        .and(warp::post())
        .and(warp::body::content_length_limit(4 * 1024))
        .and(warp::body::json())
        .and(registry_filter.clone())
        .and_then(subscribe::subscribe);

    let subscriber_count_route = warp::path!("api" / "v1" / "subscribers" / "count")
        .and(warp::get())
        .and(registry_filter)
        .and_then(subscribe::subscriber_count);

    info!("All routes configured successfully.");

    cron_route
        .or(macro_route)
        .or(bonds_route)
        .or(stocks_route)
        .or(news_route)
        .or(history_route)
        .or(subscribe_route)
        .or(subscriber_count_route)
        .recover(handle_rejection)
}
