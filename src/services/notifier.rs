// src/services/notifier.rs
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use super::cache::CacheStore;
use super::digest::{render_digest, DigestInputs, SUBJECT};
use super::email::DeliveryChannel;
use super::subscribers::SubscriberRegistry;

/// Tries each channel in order and stops at the first one that delivered to
/// at least one recipient. Returns that channel's count, or zero.
pub async fn deliver(
    channels: &[Box<dyn DeliveryChannel>],
    recipients: &[String],
    subject: &str,
    html_body: &str,
) -> usize {
    for channel in channels {
        let sent = channel.send(recipients, subject, html_body).await;
        if sent > 0 {
            info!("Digest delivered to {}/{} recipients via {}", sent, recipients.len(), channel.name());
            return sent;
        }
        warn!("Channel {} delivered nothing, trying the next one", channel.name());
    }
    0
}

pub struct Notifier {
    cache: Arc<CacheStore>,
    subscribers: SubscriberRegistry,
    channels: Vec<Box<dyn DeliveryChannel>>,
}

impl Notifier {
    pub fn new(
        cache: Arc<CacheStore>,
        subscribers: SubscriberRegistry,
        channels: Vec<Box<dyn DeliveryChannel>>,
    ) -> Self {
        Self { cache, subscribers, channels }
    }

    /// Emails the digest built from the current cache to every subscriber.
    /// Never fetches. Returns how many subscribers received it.
    pub async fn send_daily_summary(&self) -> usize {
        let recipients = self.subscribers.list();
        if recipients.is_empty() {
            info!("No subscribers, skipping the daily digest");
            return 0;
        }

        let inputs = DigestInputs::from_cache(&self.cache);
        let body = render_digest(&inputs, Utc::now());
        deliver(&self.channels, &recipients, SUBJECT, &body).await
    }
}
