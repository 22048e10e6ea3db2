use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;

use crate::app_config::ServiceConfig;
use crate::errors::{ServiceCallOutcome, ServiceError};
use crate::lyrics::LyricLine;
use crate::providers::http::{audio_upload_form, decode, ServiceClient};
use crate::providers::{AudioRequest, Provider};

/// Client for the combined transcribe + translate service
#[derive(Debug, Clone)]
pub struct ProcessService {
    client: ServiceClient,
}

/// Time-coded lyrics returned by the combined service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessResponse {
    pub detected_language: Option<String>,
    pub original_lyrics: Vec<LyricLine>,
    pub translated_lyrics: Vec<LyricLine>,
    pub vocals_ref: Option<String>,
    pub background_ref: Option<String>,
}

/// Wire body; lyrics arrive either nested under `lyrics` or at the top level
#[derive(Debug, Deserialize)]
struct ProcessBody {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    lyrics: Option<LyricsPayload>,
    #[serde(flatten)]
    flat: LyricsPayload,
}

#[derive(Debug, Default, Deserialize)]
struct LyricsPayload {
    #[serde(default, alias = "originalLyrics")]
    original_lyrics: Vec<LyricLine>,
    #[serde(default, alias = "translatedLyrics")]
    translated_lyrics: Vec<LyricLine>,
    #[serde(default, alias = "detectedLanguage")]
    detected_language: Option<String>,
    #[serde(default, alias = "vocalsPath", alias = "vocalsRef")]
    vocals_path: Option<String>,
    #[serde(default, alias = "backgroundPath", alias = "backgroundRef")]
    background_path: Option<String>,
}

fn default_success() -> bool {
    true
}

impl ProcessResponse {
    /// Decode and check a success body from the service
    pub fn from_body(body: &str) -> ServiceCallOutcome<Self> {
        let parsed: ProcessBody = decode(body)?;

        if !parsed.success {
            return Err(ServiceError::Rejected(
                parsed.error.unwrap_or_else(|| "processing failed".to_string()),
            ));
        }

        let payload = match parsed.lyrics {
            Some(nested) if !nested.original_lyrics.is_empty() => nested,
            _ => parsed.flat,
        };

        if payload.original_lyrics.is_empty() {
            return Err(ServiceError::Parse("response contained no original lyrics".to_string()));
        }

        let original_lyrics = normalize_lines(payload.original_lyrics)?;
        let translated_lyrics = normalize_lines(payload.translated_lyrics)?;

        Ok(Self {
            detected_language: payload.detected_language.filter(|l| !l.trim().is_empty()),
            original_lyrics,
            translated_lyrics,
            vocals_ref: payload.vocals_path,
            background_ref: payload.background_path,
        })
    }
}

/// Recompute durations and reject lines whose bounds are unusable
fn normalize_lines(lines: Vec<LyricLine>) -> ServiceCallOutcome<Vec<LyricLine>> {
    lines
        .into_iter()
        .map(|line| {
            if !line.start.is_finite() || !line.end.is_finite() || line.end < line.start {
                Err(ServiceError::Parse(format!(
                    "invalid line bounds [{} - {}] for '{}'",
                    line.start, line.end, line.text
                )))
            } else {
                Ok(line.normalized())
            }
        })
        .collect()
}

impl ProcessService {
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
impl Provider for ProcessService {
    type Request = AudioRequest;
    type Response = ProcessResponse;

    async fn complete(&self, request: Self::Request) -> ServiceCallOutcome<Self::Response> {
        let form = audio_upload_form(request)?;
        let body = self.client.post_multipart(form).await?;
        let response = ProcessResponse::from_body(&body)?;

        if response.translated_lyrics.is_empty() {
            warn!("Process service returned no translated lyrics");
        }
        debug!(
            "Process service returned {} original and {} translated lines",
            response.original_lyrics.len(),
            response.translated_lyrics.len()
        );

        Ok(response)
    }

    async fn test_connection(&self) -> ServiceCallOutcome<()> {
        self.client.check_health().await
    }
}
