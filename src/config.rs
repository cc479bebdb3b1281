// src/config.rs
use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use log::{info, warn};

pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub target_lang: String,
}

#[derive(Debug, Clone)]
pub struct TradingEconomicsConfig {
    pub client_key: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
    pub timezone: Tz,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            hour: 8,
            minute: 0,
            timezone: chrono_tz::Asia::Shanghai,
        }
    }
}

/// Process configuration. Every credential is optional: a missing one turns
/// off the capability that needs it and nothing else.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cache_dir: String,
    pub warmup_stale_minutes: u64,
    pub translation: TranslationConfig,
    pub trading_economics: Option<TradingEconomicsConfig>,
    pub sendgrid: Option<SendGridConfig>,
    pub smtp: Option<SmtpConfig>,
    pub schedule: ScheduleConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let email_sender = get("EMAIL_SENDER");

        let trading_economics = match (get("TE_API_CLIENT_KEY"), get("TE_API_CLIENT_SECRET")) {
            (Some(client_key), Some(client_secret)) => Some(TradingEconomicsConfig {
                client_key,
                client_secret,
            }),
            _ => None,
        };

        let sendgrid = match (get("SENDGRID_API_KEY"), email_sender.clone()) {
            (Some(api_key), Some(sender)) => Some(SendGridConfig { api_key, sender }),
            _ => None,
        };

        let smtp = match (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASS")) {
            (Some(host), Some(user), Some(password)) => Some(SmtpConfig {
                host,
                port: parse_or(get("SMTP_PORT"), "SMTP_PORT", 587),
                sender: email_sender.clone().unwrap_or_else(|| user.clone()),
                user,
                password,
            }),
            _ => None,
        };

        let defaults = ScheduleConfig::default();
        let timezone = match get("DIGEST_TIMEZONE") {
            Some(name) => Tz::from_str(&name).unwrap_or_else(|e| {
                warn!("Invalid DIGEST_TIMEZONE {:?} ({}), using {}", name, e, defaults.timezone);
                defaults.timezone
            }),
            None => defaults.timezone,
        };
        let schedule = ScheduleConfig {
            hour: parse_or(get("DIGEST_HOUR"), "DIGEST_HOUR", defaults.hour).min(23),
            minute: parse_or(get("DIGEST_MINUTE"), "DIGEST_MINUTE", defaults.minute).min(59),
            timezone,
        };

        Config {
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT),
            cache_dir: get("CACHE_DIR").unwrap_or_else(|| "cache".to_string()),
            warmup_stale_minutes: parse_or(get("WARMUP_STALE_MINUTES"), "WARMUP_STALE_MINUTES", 180),
            translation: TranslationConfig {
                api_key: get("DEEPL_API_KEY"),
                api_url: get("DEEPL_API_URL").unwrap_or_else(|| DEFAULT_DEEPL_URL.to_string()),
                target_lang: get("TRANSLATE_TARGET_LANG").unwrap_or_else(|| "ZH".to_string()),
            },
            trading_economics,
            sendgrid,
            smtp,
            schedule,
        }
    }

    pub fn log_summary(&self) {
        info!("Cache directory: {}", self.cache_dir);
        info!("Translation enabled: {}", self.translation.api_key.is_some());
        info!("Trading Economics enabled: {}", self.trading_economics.is_some());
        info!("SendGrid delivery enabled: {}", self.sendgrid.is_some());
        info!("SMTP delivery enabled: {}", self.smtp.is_some());
        info!(
            "Daily digest at {:02}:{:02} {}",
            self.schedule.hour, self.schedule.minute, self.schedule.timezone
        );
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} must be a number, got {:?}; defaulting to {}", key, raw, default);
            default
        }),
        None => default,
    }
}
