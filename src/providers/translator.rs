//! Translators
//!
//! Users write food, workout and city names in their own language; the
//! weather and nutrition services expect English.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::config::TranslatorConfig;
use crate::error::{AppError, Result};
use crate::providers::{Translator, http_client};

#[derive(Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
    /// Numeric on success, sometimes a string on failure
    #[serde(rename = "responseStatus", default)]
    response_status: serde_json::Value,
    #[serde(rename = "responseDetails", default)]
    response_details: serde_json::Value,
}

#[derive(Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// MyMemory public translation API
pub struct MyMemoryTranslator {
    client: reqwest::Client,
    base_url: String,
    langpair: String,
}

impl MyMemoryTranslator {
    pub fn new(config: &TranslatorConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            langpair: format!("{}|{}", config.source_lang, config.target_lang),
        })
    }
}

fn status_code(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn to_english(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/get", self.base_url))
            .query(&[("q", text), ("langpair", self.langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "MyMemory returned status {}",
                status
            )));
        }

        let body: MyMemoryResponse = response.json().await?;
        if status_code(&body.response_status).is_some_and(|code| code != 200) {
            return Err(AppError::Provider(format!(
                "MyMemory rejected translation: {}",
                body.response_details
            )));
        }

        let translated = body
            .response_data
            .map(|data| data.translated_text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::Provider("MyMemory returned no translation".into()))?;

        tracing::debug!("Translated '{}' -> '{}'", text, translated);
        Ok(translated)
    }
}

/// Identity translator for deployments where users already write English
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn to_english(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}
