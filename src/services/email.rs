// src/services/email.rs
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info, warn};
use reqwest::Client;
use serde_json::json;

use crate::config::{SendGridConfig, SmtpConfig};
use super::Result;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const SENDER_NAME: &str = "Macro Dashboard";
const SMTP_TIMEOUT: Duration = Duration::from_secs(20);

/// A way of getting the digest to subscribers.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Sends one message per recipient and returns how many were accepted.
    /// Failures are reported as a lower count, never as an error.
    async fn send(&self, recipients: &[String], subject: &str, html_body: &str) -> usize;
}

/// SendGrid v3 HTTP API. Disabled without an API key and sender address.
pub struct SendGridChannel {
    client: Client,
    config: Option<SendGridConfig>,
}

impl SendGridChannel {
    pub fn new(client: Client, config: Option<SendGridConfig>) -> Self {
        Self { client, config }
    }

    async fn send_one(&self, config: &SendGridConfig, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let body = json!({
            "personalizations": [{"to": [{"email": to}]}],
            "from": {"email": config.sender, "name": SENDER_NAME},
            "subject": subject,
            "content": [{"type": "text/html", "value": html_body}],
        });

        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("SendGrid returned {}: {}", status, error_text).into());
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryChannel for SendGridChannel {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, recipients: &[String], subject: &str, html_body: &str) -> usize {
        let config = match &self.config {
            Some(config) => config,
            None => {
                info!("SendGrid not configured, skipping");
                return 0;
            }
        };

        let mut sent = 0;
        for to in recipients {
            match self.send_one(config, to, subject, html_body).await {
                Ok(()) => sent += 1,
                Err(e) => error!("SendGrid delivery failed: {}", e),
            }
        }
        sent
    }
}

/// STARTTLS SMTP relay with login credentials.
pub struct SmtpChannel {
    config: Option<SmtpConfig>,
}

impl SmtpChannel {
    pub fn new(config: Option<SmtpConfig>) -> Self {
        Self { config }
    }

    fn transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        Ok(transport)
    }

    fn message(config: &SmtpConfig, to: &str, subject: &str, html_body: &str) -> Result<Message> {
        let from = Mailbox::new(Some(SENDER_NAME.to_string()), config.sender.parse()?);
        let message = Message::builder()
            .from(from)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;
        Ok(message)
    }
}

#[async_trait]
impl DeliveryChannel for SmtpChannel {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, recipients: &[String], subject: &str, html_body: &str) -> usize {
        let config = match &self.config {
            Some(config) => config,
            None => {
                info!("SMTP not configured, skipping");
                return 0;
            }
        };

        let transport = match Self::transport(config) {
            Ok(transport) => transport,
            Err(e) => {
                error!("Invalid SMTP relay {}: {}", config.host, e);
                return 0;
            }
        };
        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                warn!("SMTP relay {} refused the connection", config.host);
                return 0;
            }
            Err(e) => {
                error!("SMTP relay {} unreachable: {}", config.host, e);
                return 0;
            }
        }

        let mut sent = 0;
        for to in recipients {
            let message = match Self::message(config, to, subject, html_body) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Skipping recipient, could not build message: {}", e);
                    continue;
                }
            };
            match transport.send(message).await {
                Ok(_) => sent += 1,
                Err(e) => error!("SMTP delivery failed: {}", e),
            }
        }
        sent
    }
}
