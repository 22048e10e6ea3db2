/*!
 * Service orchestrator for one audio processing job.
 *
 * The orchestrator drives an upload through the processing stages:
 * 1. Process: combined service returning time-coded bilingual lyrics
 * 2. Transcribe: fallback when the process stage is unusable, returning a
 *    flat transcript that is segmented and timed locally
 * 3. Translate: only when the transcript arrived without a translation
 *
 * Stages run strictly one after another and each call is abandoned at its
 * deadline. A job always yields a `ProcessingResult`: when every stage fails
 * the result is a three-line diagnostic instead of lyrics.
 */

use anyhow::Result;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::app_config::{Config, TimelineConfig};
use crate::captions::{extract, remap, TimelineBuilder};
use crate::errors::{FailureCategory, ServiceCallOutcome, ServiceError};
use crate::language_utils;
use crate::lyrics::{LyricLine, ProcessingResult};
use crate::providers::{
    AudioPayload, AudioRequest, ProcessResponse, ProcessService, Provider, TranscribeResponse,
    TranscribeService, TranslateRequest, TranslateResponse, TranslateService,
};

use super::diagnostics;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Deadline for the process stage
    pub process_timeout: Duration,

    /// Deadline for the transcribe stage
    pub transcribe_timeout: Duration,

    /// Deadline for the translation call
    pub translate_timeout: Duration,

    /// Whether the process stage is attempted
    pub process_enabled: bool,

    /// Whether the transcribe stage is attempted
    pub transcribe_enabled: bool,

    /// Whether the translation call is attempted
    pub translate_enabled: bool,

    /// Caption timing rules
    pub timeline: TimelineConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl OrchestratorConfig {
    /// Build the orchestrator settings from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        let services = &config.services;
        Self {
            process_timeout: Duration::from_secs(services.process.timeout_secs),
            transcribe_timeout: Duration::from_secs(services.transcribe.timeout_secs),
            translate_timeout: Duration::from_secs(services.translate.timeout_secs),
            process_enabled: services.process.enabled,
            transcribe_enabled: services.transcribe.enabled,
            translate_enabled: services.translate.enabled,
            timeline: config.timeline.clone(),
        }
    }

    /// Use the same deadline for every stage.
    pub fn with_timeouts(mut self, timeout: Duration) -> Self {
        self.process_timeout = timeout;
        self.transcribe_timeout = timeout;
        self.translate_timeout = timeout;
        self
    }
}

/// One upload to process.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Audio to upload
    pub audio: AudioPayload,

    /// Language hint for the audio
    pub source_language: String,

    /// Language to translate into
    pub target_language: String,

    /// Media duration from the player, when known
    pub media_duration: Option<f64>,
}

impl JobRequest {
    /// Create a new job request.
    pub fn new(audio: AudioPayload, source_language: &str, target_language: &str) -> Self {
        Self {
            audio,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            media_duration: None,
        }
    }

    /// Set the media duration hint.
    pub fn with_media_duration(mut self, seconds: Option<f64>) -> Self {
        self.media_duration = seconds.filter(|d| d.is_finite() && *d > 0.0);
        self
    }

    fn audio_request(&self) -> AudioRequest {
        AudioRequest::new(self.audio.clone(), &self.source_language, &self.target_language)
    }
}

/// Stages of a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Combined process service
    Process,
    /// Transcription service
    Transcribe,
    /// Translation service
    Translate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Process => write!(f, "process"),
            Stage::Transcribe => write!(f, "transcribe"),
            Stage::Translate => write!(f, "translate"),
        }
    }
}

/// One service call made during a job.
#[derive(Debug, Clone, PartialEq)]
pub struct StageAttempt {
    pub stage: Stage,
    pub elapsed: Duration,
    pub error: Option<ServiceError>,
}

/// What happened during a job, reported next to its result.
#[derive(Debug, Clone, Default)]
pub struct ProcessingReport {
    /// Stage that produced the original lyrics; `None` when the job failed
    pub completed_by: Option<Stage>,

    /// Every service call, in order
    pub attempts: Vec<StageAttempt>,

    /// Error that ended the job
    pub terminal_error: Option<ServiceError>,

    /// Translation call failure; the translated track holds placeholders
    pub translation_error: Option<ServiceError>,

    /// Wall time of the whole job
    pub elapsed: Duration,
}

impl ProcessingReport {
    /// Whether the result holds real lyrics rather than a diagnostic.
    pub fn is_success(&self) -> bool {
        self.terminal_error.is_none() && self.completed_by.is_some()
    }

    /// Success with a real translated track, safe to keep for replay.
    pub fn is_complete(&self) -> bool {
        self.is_success() && self.translation_error.is_none()
    }

    /// Category of the terminal error, if the job failed.
    pub fn failure_category(&self) -> Option<FailureCategory> {
        self.terminal_error.as_ref().map(ServiceError::category)
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        parts.push(format!("Duration: {:.2}s", self.elapsed.as_secs_f32()));

        let attempts: Vec<String> = self
            .attempts
            .iter()
            .map(|a| match &a.error {
                Some(e) => format!("{} failed ({})", a.stage, e),
                None => format!("{} ok", a.stage),
            })
            .collect();
        parts.push(format!("Attempts: {}", attempts.join(", ")));

        if let Some(stage) = self.completed_by {
            parts.push(format!("Lyrics from: {}", stage));
        }
        if let Some(ref error) = self.terminal_error {
            parts.push(format!("Error: {}", error));
        }
        if let Some(ref error) = self.translation_error {
            parts.push(format!("Translation: {}", error));
        }

        parts.join(" | ")
    }

    fn record(&mut self, stage: Stage, elapsed: Duration, error: Option<ServiceError>) {
        self.attempts.push(StageAttempt { stage, elapsed, error });
    }
}

/// Translation material available for the translated track
enum RawTranslation {
    /// One translated text per original line
    PerLine(Vec<String>),
    /// One flat translated text
    Flat(String),
    /// Nothing yet; ask the translation service
    Missing,
}

/// Orchestrator over the three processing services.
#[derive(Debug)]
pub struct Orchestrator<P, T, X> {
    process: P,
    transcribe: T,
    translate: X,
    config: OrchestratorConfig,
    timeline: TimelineBuilder,
}

/// Orchestrator over the real HTTP services
pub type HttpOrchestrator = Orchestrator<ProcessService, TranscribeService, TranslateService>;

impl HttpOrchestrator {
    /// Build HTTP clients for every configured service.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ProcessService::new(&config.services.process)?,
            TranscribeService::new(&config.services.transcribe)?,
            TranslateService::new(&config.services.translate)?,
            OrchestratorConfig::from_config(config),
        ))
    }
}

impl<P, T, X> Orchestrator<P, T, X>
where
    P: Provider<Request = AudioRequest, Response = ProcessResponse>,
    T: Provider<Request = AudioRequest, Response = TranscribeResponse>,
    X: Provider<Request = TranslateRequest, Response = TranslateResponse>,
{
    /// Create a new orchestrator.
    pub fn new(process: P, transcribe: T, translate: X, config: OrchestratorConfig) -> Self {
        let timeline = TimelineBuilder::from_config(&config.timeline);
        Self {
            process,
            transcribe,
            translate,
            config,
            timeline,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Drive one upload through the stages.
    ///
    /// Never fails: when no stage produces lyrics the returned result is a
    /// diagnostic and the report carries the terminal error.
    pub async fn process(&self, request: JobRequest) -> (ProcessingResult, ProcessingReport) {
        let started = Instant::now();
        let mut report = ProcessingReport::default();

        info!(
            "Processing '{}' ({} bytes, {} -> {})",
            request.audio.file_name,
            request.audio.bytes.len(),
            request.source_language,
            request.target_language
        );

        // Stage 1: combined service
        let primary = self
            .call(
                Stage::Process,
                self.config.process_enabled,
                self.config.process_timeout,
                self.process.complete(request.audio_request()),
                &mut report,
            )
            .await;

        let result = match primary {
            Ok(response) => {
                report.completed_by = Some(Stage::Process);
                self.finish_from_process(response, &request, &mut report).await
            }
            Err(e) if !e.allows_fallback() => self.fail(e, &request, &mut report),
            Err(e) => {
                warn!("Process stage unusable ({}), falling back to transcription", e);

                // Stage 2: transcription fallback
                let secondary = self
                    .call(
                        Stage::Transcribe,
                        self.config.transcribe_enabled,
                        self.config.transcribe_timeout,
                        self.transcribe.complete(request.audio_request()),
                        &mut report,
                    )
                    .await;

                match secondary {
                    Ok(response) => {
                        report.completed_by = Some(Stage::Transcribe);
                        self.finish_from_transcript(response, &request, &mut report).await
                    }
                    Err(e) => self.fail(e, &request, &mut report),
                }
            }
        };

        report.elapsed = started.elapsed();
        info!("{}", report.summary());
        (result, report)
    }

    /// Query every service's health endpoint.
    pub async fn health(&self) -> Vec<(Stage, ServiceCallOutcome<()>)> {
        vec![
            (Stage::Process, self.process.test_connection().await),
            (Stage::Transcribe, self.transcribe.test_connection().await),
            (Stage::Translate, self.translate.test_connection().await),
        ]
    }

    /// Run one service call under its deadline and record the attempt.
    async fn call<F, R>(
        &self,
        stage: Stage,
        enabled: bool,
        deadline: Duration,
        call: F,
        report: &mut ProcessingReport,
    ) -> ServiceCallOutcome<R>
    where
        F: Future<Output = ServiceCallOutcome<R>>,
    {
        let started = Instant::now();

        let outcome = if !enabled {
            Err(ServiceError::Network(format!("{} service is disabled", stage)))
        } else {
            // Dropping the future on expiry abandons the request
            match tokio::time::timeout(deadline, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ServiceError::Timeout {
                    after_secs: deadline.as_secs(),
                }),
            }
        };

        match &outcome {
            Ok(_) => debug!("{} stage succeeded in {:?}", stage, started.elapsed()),
            Err(e) => warn!("{} stage failed after {:?}: {}", stage, started.elapsed(), e),
        }
        report.record(stage, started.elapsed(), outcome.as_ref().err().cloned());

        outcome
    }

    async fn finish_from_process(
        &self,
        response: ProcessResponse,
        request: &JobRequest,
        report: &mut ProcessingReport,
    ) -> ProcessingResult {
        let original = response.original_lyrics;

        let raw = if response.translated_lyrics.is_empty() {
            RawTranslation::Missing
        } else {
            RawTranslation::PerLine(response.translated_lyrics.into_iter().map(|l| l.text).collect())
        };
        let original_text = original
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let (translated, analysis_text) = self
            .translated_track(&original, &original_text, raw, request, report)
            .await;

        ProcessingResult {
            detected_language: response
                .detected_language
                .unwrap_or_else(|| request.source_language.clone()),
            original_lyrics: original,
            translated_lyrics: translated,
            analysis_text,
            vocals_ref: response.vocals_ref,
            background_ref: response.background_ref,
        }
    }

    async fn finish_from_transcript(
        &self,
        response: TranscribeResponse,
        request: &JobRequest,
        report: &mut ProcessingReport,
    ) -> ProcessingResult {
        let duration = response
            .duration
            .or(request.media_duration)
            .unwrap_or(self.config.timeline.fallback_duration_secs);
        debug!("Timing transcript against {:.2}s", duration);

        let original = self.timeline.build(&response.transcription, duration);

        let raw = match response.translated_transcription {
            Some(text) => RawTranslation::Flat(text),
            None => RawTranslation::Missing,
        };
        let (translated, analysis_text) = self
            .translated_track(&original, &response.transcription, raw, request, report)
            .await;

        ProcessingResult {
            detected_language: response
                .detected_language
                .unwrap_or_else(|| request.source_language.clone()),
            original_lyrics: original,
            translated_lyrics: translated,
            analysis_text,
            vocals_ref: response.vocals_ref,
            background_ref: response.background_ref,
        }
    }

    /// Build the translated track on the original timing, with the extracted reasoning.
    async fn translated_track(
        &self,
        original: &[LyricLine],
        original_text: &str,
        raw: RawTranslation,
        request: &JobRequest,
        report: &mut ProcessingReport,
    ) -> (Vec<LyricLine>, String) {
        let target = request.target_language.as_str();

        if language_utils::languages_match(&request.source_language, target) {
            debug!("Source and target language match, reusing the original track");
            return (original.to_vec(), String::new());
        }

        let flat = match raw {
            RawTranslation::PerLine(texts) => {
                let extracted: Vec<_> = texts.iter().map(|t| extract(t)).collect();
                let sentences: Vec<String> = extracted.iter().map(|e| e.clean_text.clone()).collect();
                let reasoning = extracted
                    .iter()
                    .map(|e| e.reasoning.as_str())
                    .filter(|r| !r.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                return (remap(&sentences, original, target), reasoning);
            }
            RawTranslation::Flat(text) => text,
            RawTranslation::Missing => {
                let call = self.translate.complete(TranslateRequest::new(
                    original_text,
                    &request.source_language,
                    target,
                ));
                match self
                    .call(
                        Stage::Translate,
                        self.config.translate_enabled,
                        self.config.translate_timeout,
                        call,
                        report,
                    )
                    .await
                {
                    Ok(response) => response.translated_text,
                    Err(e) => {
                        warn!("Translation unavailable, using placeholders: {}", e);
                        let analysis = format!("Translation unavailable: {}", e);
                        report.translation_error = Some(e);
                        return (remap(&[], original, target), analysis);
                    }
                }
            }
        };

        let extraction = extract(&flat);
        debug!("Translation extracted with rule {:?}", extraction.rule);
        let translated = self.timeline.build_translated(&extraction.clean_text, original, target);
        (translated, extraction.reasoning)
    }

    fn fail(&self, error: ServiceError, request: &JobRequest, report: &mut ProcessingReport) -> ProcessingResult {
        error!("Processing '{}' failed: {}", request.audio.file_name, error);
        let result = diagnostics::failure_result(&error, &request.source_language);
        report.terminal_error = Some(error);
        result
    }
}
