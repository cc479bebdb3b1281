// src/handlers/subscribe.rs
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::with_status;
use warp::Rejection;

use super::error::ApiError;
use crate::services::subscribers::SubscriberRegistry;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
struct SubscribeResponse {
    ok: bool,
    message: String,
    subscriber_count: usize,
}

pub async fn subscribe(
    request: SubscribeRequest,
    registry: SubscriberRegistry,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling subscription request");

    let outcome = registry.add(request.email.trim()).map_err(|e| {
        error!("Failed to persist subscriber: {}", e);
        warp::reject::custom(ApiError::storage_error(e))
    })?;

    let status = if outcome.ok { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    let response = SubscribeResponse {
        ok: outcome.ok,
        message: outcome.message,
        subscriber_count: registry.list().len(),
    };
    Ok(with_status(warp::reply::json(&response), status))
}

pub async fn subscriber_count(registry: SubscriberRegistry) -> Result<impl warp::Reply, Rejection> {
    let subscribers = registry.try_list().map_err(|e| {
        error!("Failed to read subscribers: {}", e);
        warp::reject::custom(ApiError::storage_error(e))
    })?;
    Ok(warp::reply::json(&json!({ "count": subscribers.len() })))
}
