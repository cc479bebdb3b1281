use dotenv::dotenv;
use log::{error, info};
use macro_dashboard_digest::config::Config;
use macro_dashboard_digest::routes;
use macro_dashboard_digest::services::pipeline::DigestPipeline;
use macro_dashboard_digest::services::scheduler::DailyScheduler;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = Config::from_env();
    config.log_summary();

    let pipeline = Arc::new(
        DigestPipeline::from_config(&config).map_err(|e| anyhow::anyhow!("Failed to build pipeline: {}", e))?,
    );

    // Daily digest timer, started once for the life of the process
    let scheduler = DailyScheduler::new(config.schedule.clone(), pipeline.clone());
    if let Err(e) = scheduler.start().await {
        error!("Failed to start the daily scheduler: {}", e);
    }

    info!("Running warmup refresh (stale after {} minutes)", config.warmup_stale_minutes);
    if let Some(report) = pipeline.warmup(config.warmup_stale_minutes).await {
        info!("Warmup refresh: {}", report);
    }

    // Bind to 0.0.0.0 for container platforms
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    // Set up routes
    let api = routes::routes(pipeline.clone()).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;

    Ok(())
}
