// src/services/translate.rs
use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::Deserialize;

use crate::config::TranslationConfig;
use super::Result;

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// Translation used for non-native news. Never fails: anything that cannot
/// be translated comes back unchanged.
#[async_trait]
pub trait TextTranslator: Send + Sync {
    async fn translate(&self, text: &str) -> String;
}

/// Best-effort DeepL translation. Without an API key this is a pass-through.
#[derive(Clone)]
pub struct DeepLTranslator {
    client: Client,
    config: TranslationConfig,
}

impl DeepLTranslator {
    pub fn new(client: Client, config: TranslationConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn request(&self, key: &str, text: &str) -> Result<String> {
        let response: DeepLResponse = self
            .client
            .post(&self.config.api_url)
            .form(&[
                ("auth_key", key),
                ("text", text),
                ("target_lang", self.config.target_lang.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = response
            .translations
            .into_iter()
            .next()
            .ok_or("Empty translation response")?;
        Ok(first.text)
    }
}

#[async_trait]
impl TextTranslator for DeepLTranslator {
    /// Returns `text` unchanged when translation is off, the input is empty,
    /// or the request fails for any reason.
    async fn translate(&self, text: &str) -> String {
        let key = match self.config.api_key.as_deref() {
            Some(key) if !text.is_empty() => key,
            _ => return text.to_string(),
        };

        match self.request(key, text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}
