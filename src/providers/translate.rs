use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_config::ServiceConfig;
use crate::errors::{ServiceCallOutcome, ServiceError};
use crate::providers::http::{decode, ServiceClient};
use crate::providers::Provider;

/// Client for the text translation service
#[derive(Debug, Clone)]
pub struct TranslateService {
    client: ServiceClient,
}

/// Translation request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateRequest {
    /// Text to translate
    pub text: String,
    /// Language of the text
    pub from_language: String,
    /// Language to translate into
    pub to_language: String,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, from_language: impl Into<String>, to_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from_language: from_language.into(),
            to_language: to_language.into(),
        }
    }
}

/// Raw translation, possibly still carrying a reasoning block
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "translatedText")]
    translated_text: Option<String>,
}

fn default_success() -> bool {
    true
}

impl TranslateResponse {
    /// Decode and check a success body from the service
    pub fn from_body(body: &str) -> ServiceCallOutcome<Self> {
        let parsed: TranslateBody = decode(body)?;

        if !parsed.success {
            return Err(ServiceError::Rejected(
                parsed.error.unwrap_or_else(|| "translation failed".to_string()),
            ));
        }

        let translated_text = parsed
            .translated_text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::Parse("response contained no translated text".to_string()))?;

        Ok(Self { translated_text })
    }
}

impl TranslateService {
    /// Create a client from a service configuration
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: ServiceClient::new(&config.endpoint, config.timeout_secs)?,
        })
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }
}

#[async_trait]
impl Provider for TranslateService {
    type Request = TranslateRequest;
    type Response = TranslateResponse;

    async fn complete(&self, request: Self::Request) -> ServiceCallOutcome<Self::Response> {
        let body = self.client.post_json(&request).await?;
        TranslateResponse::from_body(&body)
    }

    async fn test_connection(&self) -> ServiceCallOutcome<()> {
        self.client.check_health().await
    }
}
