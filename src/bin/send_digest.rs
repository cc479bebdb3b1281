// src/bin/send_digest.rs
use dotenv::dotenv;
use log::info;
use macro_dashboard_digest::config::Config;
use macro_dashboard_digest::services::pipeline::DigestPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    config.log_summary();

    let pipeline = DigestPipeline::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build pipeline: {}", e))?;

    info!("Sending the digest from the current cache (no refresh)...");
    let sent = pipeline.notifier().send_daily_summary().await;
    println!("Digest sent to {} recipient(s)", sent);

    Ok(())
}
