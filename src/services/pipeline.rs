// src/services/pipeline.rs
use std::sync::Arc;

use log::{error, info};

use crate::config::Config;
use super::cache::CacheStore;
use super::email::{DeliveryChannel, SendGridChannel, SmtpChannel};
use super::http::build_client;
use super::notifier::Notifier;
use super::refresh::{RefreshReport, Refresher};
use super::sources::LiveSources;
use super::subscribers::SubscriberRegistry;
use super::Result;

/// Refresh followed by notify: the body of both the daily job and the
/// on-demand `/cron` route.
pub struct DigestPipeline {
    refresher: Refresher,
    notifier: Notifier,
}

impl DigestPipeline {
    pub fn new(refresher: Refresher, notifier: Notifier) -> Self {
        Self { refresher, notifier }
    }

    /// Wires the live providers and delivery channels. SendGrid is tried
    /// first, SMTP second.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Arc::new(CacheStore::new(&config.cache_dir)?);
        let client = build_client()?;

        let sources = Arc::new(LiveSources::new(client.clone(), config));
        let refresher = Refresher::new(cache.clone(), sources);

        let channels: Vec<Box<dyn DeliveryChannel>> = vec![
            Box::new(SendGridChannel::new(client, config.sendgrid.clone())),
            Box::new(SmtpChannel::new(config.smtp.clone())),
        ];
        let notifier = Notifier::new(cache.clone(), SubscriberRegistry::new(cache), channels);

        Ok(Self::new(refresher, notifier))
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        self.refresher.cache()
    }

    pub fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Refresh with a zero caller threshold (macro and bonds always
    /// re-fetched, the rest on their own cadence), then the digest. A failed
    /// refresh skips the digest.
    pub async fn run(&self) -> Result<usize> {
        let report = self.refresher.refresh_all(0).await?;
        info!("Digest refresh finished: {}", report);
        Ok(self.notifier.send_daily_summary().await)
    }

    /// Startup refresh. Errors are logged and the process keeps serving
    /// whatever is already cached.
    pub async fn warmup(&self, stale_minutes: u64) -> Option<RefreshReport> {
        match self.refresher.refresh_all(stale_minutes).await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Warmup refresh failed: {}", e);
                None
            }
        }
    }
}
