// src/services/scheduler.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{error, info};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::ScheduleConfig;
use super::pipeline::DigestPipeline;

/// Six-field cron expression (seconds first) firing once a day.
pub fn cron_expression(schedule: &ScheduleConfig) -> String {
    format!("0 {} {} * * *", schedule.minute, schedule.hour)
}

/// Next wall-clock firing strictly after `now`, in the schedule's timezone.
pub fn next_fire_time(schedule: &ScheduleConfig, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
    let target = NaiveTime::from_hms_opt(schedule.hour, schedule.minute, 0)?;
    let local_now = now.with_timezone(&schedule.timezone);

    let mut day = local_now.date_naive();
    // A local time can be missing on DST transition days.
    for _ in 0..3 {
        if let Some(candidate) = schedule
            .timezone
            .from_local_datetime(&day.and_time(target))
            .earliest()
        {
            if candidate > local_now {
                return Some(candidate);
            }
        }
        day = day + Duration::days(1);
    }
    None
}

/// One firing of the daily job. Errors end the firing and are logged; the
/// job stays registered for the next day.
pub async fn run_daily_job(pipeline: &DigestPipeline) {
    info!("Daily digest job started");
    match pipeline.run().await {
        Ok(sent) => info!("Daily digest job finished, {} recipient(s)", sent),
        Err(e) => error!("Daily digest job failed, digest not sent: {}", e),
    }
}

/// Process-wide daily timer. Built once in `main`; `start` only has an
/// effect the first time it is called.
pub struct DailyScheduler {
    schedule: ScheduleConfig,
    pipeline: Arc<DigestPipeline>,
    running: AtomicBool,
    inner: Mutex<Option<JobScheduler>>,
}

impl DailyScheduler {
    pub fn new(schedule: ScheduleConfig, pipeline: Arc<DigestPipeline>) -> Self {
        Self {
            schedule,
            pipeline,
            running: AtomicBool::new(false),
            inner: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Registers the daily job and starts the timer. Returns `false` without
    /// doing anything if it is already running.
    pub async fn start(&self) -> Result<bool> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Scheduler already running");
            return Ok(false);
        }

        match self.build().await {
            Ok(scheduler) => {
                *self.inner.lock().await = Some(scheduler);
                info!(
                    "Scheduler started: daily at {:02}:{:02} {}",
                    self.schedule.hour, self.schedule.minute, self.schedule.timezone
                );
                Ok(true)
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn build(&self) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new().await?;
        let pipeline = self.pipeline.clone();

        let job = Job::new_async_tz(
            cron_expression(&self.schedule).as_str(),
            self.schedule.timezone,
            move |_uuid, _lock| {
                let pipeline = pipeline.clone();
                Box::pin(async move {
                    run_daily_job(&pipeline).await;
                })
            },
        )?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        Ok(scheduler)
    }

    pub async fn stop(&self) -> Result<()> {
        if let Some(mut scheduler) = self.inner.lock().await.take() {
            scheduler.shutdown().await?;
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}
