use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::app_config::ServiceConfig;
use crate::errors::{ServiceCallOutcome, ServiceError};
use crate::providers::http::{audio_upload_form, decode, ServiceClient};
use crate::providers::{AudioRequest, Provider};

/// Transcript value the service returns when transcription failed internally
pub const TRANSCRIPTION_FAILED: &str = "TRANSCRIPTION_FAILED";

/// Client for the transcription service
#[derive(Debug, Clone)]
pub struct TranscribeService {
    client: ServiceClient,
}

/// Flat transcript returned by the transcription service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscribeResponse {
    pub transcription: String,
    pub translated_transcription: Option<String>,
    pub detected_language: Option<String>,
    pub duration: Option<f64>,
    pub vocals_ref: Option<String>,
    pub background_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscribeBody {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "text")]
    transcription: Option<String>,
    #[serde(default, alias = "translatedTranscription", alias = "translation")]
    translated_transcription: Option<String>,
    #[serde(default, alias = "detectedLanguage")]
    detected_language: Option<String>,
    #[serde(default, alias = "audioDuration", alias = "audio_duration")]
    duration: Option<f64>,
    #[serde(default, alias = "vocalsPath", alias = "vocalsRef")]
    vocals_path: Option<String>,
    #[serde(default, alias = "backgroundPath", alias = "backgroundRef")]
    background_path: Option<String>,
}

fn default_success() -> bool {
    true
}

impl TranscribeResponse {
    /// Decode and check a success body from the service.
    ///
    /// The failure sentinel wins over every other field, including `success`.
    pub fn from_body(body: &str) -> ServiceCallOutcome<Self> {
        let parsed: TranscribeBody = decode(body)?;

        if let Some(text) = &parsed.transcription {
            if text.trim() == TRANSCRIPTION_FAILED {
                return Err(ServiceError::SentinelFailure(
                    parsed.error.unwrap_or_else(|| TRANSCRIPTION_FAILED.to_string()),
                ));
            }
        }

        if !parsed.success {
            return Err(ServiceError::Rejected(
                parsed.error.unwrap_or_else(|| "transcription failed".to_string()),
            ));
        }

        let transcription = parsed
            .transcription
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Parse("response contained no transcription".to_string()))?;

        Ok(Self {
            transcription,
            translated_transcription: parsed
                .translated_transcription
                .filter(|t| !t.trim().is_empty()),
            detected_language: parsed.detected_language.filter(|l| !l.trim().is_empty()),
            duration: parsed.duration.filter(|d| d.is_finite() && *d > 0.0),
            vocals_ref: parsed.vocals_path,
            background_ref: parsed.background_path,
        })
    }
}

impl TranscribeService {
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
impl Provider for TranscribeService {
    type Request = AudioRequest;
    type Response = TranscribeResponse;

    async fn complete(&self, request: Self::Request) -> ServiceCallOutcome<Self::Response> {
        let form = audio_upload_form(request)?;
        let body = self.client.post_multipart(form).await?;
        let response = TranscribeResponse::from_body(&body)?;

        debug!(
            "Transcription: {} words, duration {:?}, language {:?}",
            response.transcription.split_whitespace().count(),
            response.duration,
            response.detected_language
        );

        Ok(response)
    }

    async fn test_connection(&self) -> ServiceCallOutcome<()> {
        self.client.check_health().await
    }
}
