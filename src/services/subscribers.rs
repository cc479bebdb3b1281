// src/services/subscribers.rs
use std::sync::{Arc, OnceLock};

use log::{info, warn};
use regex::Regex;
use serde::Serialize;

use super::cache::{CacheStore, SUBSCRIBERS};
use super::Result;

pub const INVALID_FORMAT: &str = "Invalid email address format";
pub const ALREADY_SUBSCRIBED: &str = "Already subscribed";
pub const SUBSCRIBED: &str = "OK";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

pub fn is_valid_email(address: &str) -> bool {
    email_pattern().is_match(address)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeOutcome {
    pub ok: bool,
    pub message: String,
}

impl SubscribeOutcome {
    fn new(ok: bool, message: &str) -> Self {
        Self { ok, message: message.to_string() }
    }
}

/// Subscriber list kept as a JSON array in the cache directory. Nothing is
/// held in memory; every call goes back to the file.
#[derive(Clone)]
pub struct SubscriberRegistry {
    cache: Arc<CacheStore>,
}

impl SubscriberRegistry {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    pub fn add(&self, address: &str) -> Result<SubscribeOutcome> {
        if !is_valid_email(address) {
            return Ok(SubscribeOutcome::new(false, INVALID_FORMAT));
        }

        // an unreadable list must not be replaced by a one-entry list
        let mut subscribers = self.try_list()?;
        if subscribers.iter().any(|s| s == address) {
            return Ok(SubscribeOutcome::new(true, ALREADY_SUBSCRIBED));
        }

        subscribers.push(address.to_string());
        self.cache.save_json(SUBSCRIBERS, &subscribers)?;
        info!("New subscriber added ({} total)", subscribers.len());
        Ok(SubscribeOutcome::new(true, SUBSCRIBED))
    }

    /// Subscribers in the order they joined. A list that was never written
    /// is empty; one that cannot be read or parsed is an error.
    pub fn try_list(&self) -> Result<Vec<String>> {
        Ok(self.cache.try_load_json::<Vec<String>>(SUBSCRIBERS)?.unwrap_or_default())
    }

    /// Like [`try_list`](Self::try_list), with read failures logged and
    /// treated as no subscribers.
    pub fn list(&self) -> Vec<String> {
        self.try_list().unwrap_or_else(|e| {
            warn!("Subscriber list unavailable: {}", e);
            Vec::new()
        })
    }
}
