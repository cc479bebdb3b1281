// src/bin/force_refresh.rs
use dotenv::dotenv;
use log::{error, info};
use macro_dashboard_digest::config::Config;
use macro_dashboard_digest::services::pipeline::DigestPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    info!("Forcing macro and bonds, refreshing stale artifacts in {}", config.cache_dir);

    let pipeline = DigestPipeline::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build pipeline: {}", e))?;

    match pipeline.refresher().refresh_all(0).await {
        Ok(report) => {
            info!("✓ Refresh completed");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Err(e) => {
            error!("✗ Refresh failed: {}", e);
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
