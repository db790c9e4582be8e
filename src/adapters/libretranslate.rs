use crate::config::TranslationConfig;
use crate::domain::Translator;
use crate::utils::error::{MealLensError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

pub struct LibreTranslateClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl LibreTranslateClient {
    pub fn new(config: &TranslationConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        }
    }
}

impl std::fmt::Debug for LibreTranslateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslateClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate", self.base_url);
        tracing::debug!("Translating {} -> {} via {}", source, target, url);

        let body = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MealLensError::Translation {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MealLensError::Translation {
                message: format!("translate returned {}: {}", status, detail),
            });
        }

        let translated: TranslateResponse =
            response
                .json()
                .await
                .map_err(|e| MealLensError::Translation {
                    message: format!("unreadable translate body: {}", e),
                })?;

        Ok(translated.translated_text)
    }
}
