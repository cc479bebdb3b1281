// src/bin/test_timers.rs
use chrono::Utc;
use dotenv::dotenv;
use log::info;
use macro_dashboard_digest::config::Config;
use macro_dashboard_digest::services::scheduler::{cron_expression, next_fire_time};

fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let schedule = &config.schedule;

    let now = Utc::now();
    info!("Current time:");
    info!("  UTC: {}", now);
    info!("  {}: {}", schedule.timezone, now.with_timezone(&schedule.timezone));

    info!("Daily digest schedule:");
    info!("  Cron expression: {}", cron_expression(schedule));
    match next_fire_time(schedule, now) {
        Some(next) => {
            info!("  Next firing: {}", next);
            info!("  Next firing (UTC): {}", next.with_timezone(&Utc));
            info!("  Time until next firing: {} minutes", (next.with_timezone(&Utc) - now).num_minutes());
        }
        None => info!("  No firing found in the next few days"),
    }
}
