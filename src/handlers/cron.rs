// src/handlers/cron.rs
use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use warp::http::StatusCode;
use warp::reply::with_status;

use crate::services::pipeline::DigestPipeline;

/// `GET /cron`: forced macro/bonds refresh plus any other stale artifact,
/// then the digest. Plain-text reply either way so external cron services
/// can log it.
pub async fn run_cron(pipeline: Arc<DigestPipeline>) -> Result<impl warp::Reply, Infallible> {
    info!("Handling on-demand refresh request");

    match pipeline.run().await {
        Ok(sent) => Ok(with_status(
            format!(
                "Refreshed and email sent to {} recipients at {}Z\n",
                sent,
                Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f")
            ),
            StatusCode::OK,
        )),
        Err(e) => {
            error!("On-demand refresh failed: {}", e);
            Ok(with_status(format!("Error: {}\n", e), StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
