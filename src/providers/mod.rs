/*!
 * Client implementations for the external processing services.
 *
 * This module contains one client per service the orchestrator talks to:
 * - `process`: combined transcription + translation service
 * - `transcribe`: transcription (and stem separation) service
 * - `translate`: plain text translation service
 * - `mock`: scripted stand-in used by tests and dry runs
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::ServiceCallOutcome;

/// Common trait for all processing services
///
/// This trait defines the interface that all service clients must follow,
/// allowing the orchestrator to drive real services and mocks interchangeably.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this service
    type Request: Send + Sync;

    /// The response type for this service
    type Response: Send + Sync;

    /// Complete a request using this service
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `ServiceCallOutcome<Self::Response>` - The decoded response or a classified failure
    async fn complete(&self, request: Self::Request) -> ServiceCallOutcome<Self::Response>;

    /// Test the connection to the service
    ///
    /// # Returns
    /// * `ServiceCallOutcome<()>` - Ok if the service reports healthy
    async fn test_connection(&self) -> ServiceCallOutcome<()>;
}

/// Raw audio file to upload
#[derive(Debug, Clone)]
pub struct AudioPayload {
    /// File contents
    pub bytes: Bytes,
    /// File name sent with the upload
    pub file_name: String,
    /// MIME type of the upload
    pub mime_type: String,
}

impl AudioPayload {
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Audio upload with language hints, shared by the process and transcribe services
#[derive(Debug, Clone)]
pub struct AudioRequest {
    pub audio: AudioPayload,
    pub source_language: String,
    pub target_language: String,
}

impl AudioRequest {
    pub fn new(audio: AudioPayload, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            audio,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

pub mod http;
pub mod mock;
pub mod process;
pub mod transcribe;
pub mod translate;

pub use self::mock::{MockBehavior, MockService};
pub use self::process::{ProcessResponse, ProcessService};
pub use self::transcribe::{TranscribeResponse, TranscribeService, TRANSCRIPTION_FAILED};
pub use self::translate::{TranslateRequest, TranslateResponse, TranslateService};
