/*!
 * Shared HTTP plumbing for the processing service clients.
 *
 * Every call goes through `ServiceClient`, which owns the endpoint, the
 * per-call deadline and the classification of transport failures into
 * `ServiceError` variants.
 */

use anyhow::{Context, Result};
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::errors::{ServiceCallOutcome, ServiceError};
use crate::providers::AudioRequest;

/// Longest slice of a response body quoted in error messages
const MAX_QUOTED_BODY_CHARS: usize = 500;

/// HTTP client bound to one service endpoint
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Full URL of the service endpoint
    endpoint: Url,
    /// Deadline for one call
    timeout: Duration,
    /// HTTP client for making requests
    client: Client,
}

impl ServiceClient {
    /// Create a client for `endpoint` with a per-call deadline
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid service endpoint: {}", endpoint))?;
        let timeout = Duration::from_secs(timeout_secs);

        Ok(Self {
            endpoint,
            timeout,
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Health URL served at the root of the endpoint's origin
    pub fn health_url(&self) -> ServiceCallOutcome<Url> {
        self.endpoint
            .join("/health")
            .map_err(|e| ServiceError::Network(format!("Cannot derive health URL: {}", e)))
    }

    /// POST a multipart form and return the success body
    pub async fn post_multipart(&self, form: Form) -> ServiceCallOutcome<String> {
        debug!("POST (multipart) {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.read_body(response).await
    }

    /// POST a JSON body and return the success body
    pub async fn post_json<B: Serialize + ?Sized>(&self, body: &B) -> ServiceCallOutcome<String> {
        debug!("POST (json) {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.read_body(response).await
    }

    /// GET the health URL; any success status counts as healthy
    pub async fn check_health(&self) -> ServiceCallOutcome<()> {
        let url = self.health_url()?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.read_body(response).await.map(|_| ())
    }

    async fn read_body(&self, response: Response) -> ServiceCallOutcome<String> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            error!("{} responded with {}: {}", self.endpoint, status, quote(&body));
            return Err(ServiceError::Http {
                status_code: status.as_u16(),
                message: quote(&body),
            });
        }

        Ok(body)
    }

    /// Map a transport failure onto the service error taxonomy
    pub fn classify(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout {
                after_secs: self.timeout.as_secs(),
            }
        } else if err.is_decode() || err.is_body() {
            ServiceError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Http {
                status_code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Multipart form for an audio upload: a `file` part plus the language hints
pub fn audio_upload_form(request: AudioRequest) -> ServiceCallOutcome<Form> {
    let part = Part::bytes(request.audio.bytes.to_vec())
        .file_name(request.audio.file_name)
        .mime_str(&request.audio.mime_type)
        .map_err(|e| ServiceError::Network(format!("Invalid upload MIME type: {}", e)))?;

    Ok(Form::new()
        .part("file", part)
        .text("inputLanguage", request.source_language)
        .text("outputLanguage", request.target_language))
}

/// Decode a JSON body, quoting the raw text on failure
pub fn decode<T: DeserializeOwned>(body: &str) -> ServiceCallOutcome<T> {
    serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse service response: {}. Raw response: {}", e, quote(body));
        ServiceError::Parse(format!("{}: {}", e, quote(body)))
    })
}

/// Trim a body to a loggable length
pub fn quote(body: &str) -> String {
    if body.chars().count() > MAX_QUOTED_BODY_CHARS {
        let head: String = body.chars().take(MAX_QUOTED_BODY_CHARS).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
