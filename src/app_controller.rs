use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::{Library, ResultStore, SongRecord};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::lyrics::ProcessingResult;
use crate::pipeline::{HttpOrchestrator, JobRequest, Orchestrator, ProcessingReport};
use crate::providers::{
    AudioPayload, AudioRequest, ProcessResponse, Provider, TranscribeResponse, TranslateRequest,
    TranslateResponse,
};

// @module: Application controller for song processing

/// Export format for a processed song
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full result as pretty JSON
    Json,
    /// Bilingual SubRip captions
    Srt,
    /// Bilingual LRC lyrics
    Lrc,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Lrc => "lrc",
        }
    }

    /// Render a result in this format
    pub fn render(&self, result: &ProcessingResult) -> Result<String> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(result).context("Failed to serialize result"),
            OutputFormat::Srt => Ok(result.to_srt()),
            OutputFormat::Lrc => Ok(result.to_lrc()),
        }
    }
}

/// Options for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    // @field: Where exports go; defaults to the input's directory
    pub output_dir: Option<PathBuf>,
    // @field: Formats to export
    pub formats: Vec<OutputFormat>,
    // @field: Re-process even when the library has a result
    pub force: bool,
    // @field: Media duration override in seconds
    pub media_duration: Option<f64>,
    // @field: Show a spinner while the job runs
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            formats: vec![OutputFormat::Json],
            force: false,
            media_duration: None,
            show_progress: true,
        }
    }
}

/// Where a run's result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Produced by the services in this run
    Processed,
    /// Replayed from the song library
    Library,
    /// Every stage failed; the result is a diagnostic
    Failed,
}

/// Outcome of processing one file
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source: ResultSource,
    pub result: ProcessingResult,
    pub report: Option<ProcessingReport>,
    pub song_id: Option<String>,
    pub outputs: Vec<PathBuf>,
}

/// Counts for a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub replayed: usize,
    pub failed: usize,
    pub errors: usize,
}

/// Main application controller for song processing
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Song library, when enabled
    store: Option<Arc<dyn ResultStore>>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration and no library
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, store: None })
    }

    // @method: Attach a song library
    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Open the library the configuration asks for
    pub fn open_library(config: &Config) -> Result<Option<Arc<dyn ResultStore>>> {
        if !config.library.enabled {
            return Ok(None);
        }
        let library = match &config.library.path {
            Some(path) => Library::new(crate::database::DatabaseConnection::new(path)?),
            None => Library::new_default()?,
        };
        Ok(Some(Arc::new(library)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Option<&Arc<dyn ResultStore>> {
        self.store.as_ref()
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Process one file against the configured HTTP services
    pub async fn run(&self, input_file: &Path, options: &RunOptions) -> Result<RunSummary> {
        let orchestrator = HttpOrchestrator::from_config(&self.config)?;
        self.run_with(&orchestrator, input_file, options).await
    }

    /// Process every audio file under a folder against the configured HTTP services
    pub async fn run_folder(&self, input_dir: &Path, options: &RunOptions) -> Result<FolderSummary> {
        let orchestrator = HttpOrchestrator::from_config(&self.config)?;
        self.run_folder_with(&orchestrator, input_dir, options).await
    }

    /// Process one file with the given orchestrator
    pub async fn run_with<P, T, X>(
        &self,
        orchestrator: &Orchestrator<P, T, X>,
        input_file: &Path,
        options: &RunOptions,
    ) -> Result<RunSummary>
    where
        P: Provider<Request = AudioRequest, Response = ProcessResponse>,
        T: Provider<Request = AudioRequest, Response = TranscribeResponse>,
        X: Provider<Request = TranslateRequest, Response = TranslateResponse>,
    {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let mime_type = FileManager::audio_mime_type(input_file)
            .ok_or_else(|| anyhow!("Not a supported audio file: {:?}", input_file))?;

        let bytes = FileManager::read_bytes(input_file)?;
        let file_hash = FileManager::content_hash(&bytes);
        let file_name = input_file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());

        // Replay from the library unless forced
        if !options.force {
            if let Some(store) = &self.store {
                if let Some(song) = store.find_by_hash(&file_hash, &self.config.target_language).await? {
                    info!("Replaying '{}' from the song library ({})", file_name, song.id);
                    let outputs = self.write_outputs(input_file, &song.result, options)?;
                    return Ok(RunSummary {
                        source: ResultSource::Library,
                        result: song.result,
                        report: None,
                        song_id: Some(song.id),
                        outputs,
                    });
                }
            }
        }

        let media_duration = options
            .media_duration
            .or_else(|| FileManager::probe_duration(input_file));
        debug!("Media duration for '{}': {:?}", file_name, media_duration);

        let request = JobRequest::new(
            AudioPayload::new(bytes, file_name.clone(), mime_type),
            &self.config.source_language,
            &self.config.target_language,
        )
        .with_media_duration(media_duration);

        let spinner = Self::spinner(options.show_progress, &file_name);
        let (result, report) = orchestrator.process(request).await;

        if !report.is_success() {
            spinner.finish_with_message(format!("{} failed", file_name));
            warn!("No lyrics for '{}': {}", file_name, report.summary());
            return Ok(RunSummary {
                source: ResultSource::Failed,
                result,
                report: Some(report),
                song_id: None,
                outputs: Vec::new(),
            });
        }
        spinner.finish_with_message(format!(
            "{} done in {}",
            file_name,
            Self::format_duration(start_time.elapsed())
        ));

        let mut song_id = None;
        if !report.is_complete() {
            warn!("Not storing '{}': translation failed, it will be retried next run", file_name);
        } else if let Some(store) = &self.store {
            let song = SongRecord::new(
                file_name.clone(),
                file_hash,
                self.config.source_language.clone(),
                self.config.target_language.clone(),
                result.clone(),
            );
            match store.save(&song).await {
                Ok(()) => song_id = Some(song.id),
                Err(e) => warn!("Could not store '{}' in the song library: {}", file_name, e),
            }
        }

        let outputs = self.write_outputs(input_file, &result, options)?;

        info!(
            "Processed '{}' in {}: {} lines",
            file_name,
            Self::format_duration(start_time.elapsed()),
            result.original_lyrics.len()
        );

        Ok(RunSummary {
            source: ResultSource::Processed,
            result,
            report: Some(report),
            song_id,
            outputs,
        })
    }

    /// Process every audio file under a folder with the given orchestrator
    pub async fn run_folder_with<P, T, X>(
        &self,
        orchestrator: &Orchestrator<P, T, X>,
        input_dir: &Path,
        options: &RunOptions,
    ) -> Result<FolderSummary>
    where
        P: Provider<Request = AudioRequest, Response = ProcessResponse>,
        T: Provider<Request = AudioRequest, Response = TranscribeResponse>,
        X: Provider<Request = TranslateRequest, Response = TranslateResponse>,
    {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let audio_files = FileManager::find_audio_files(input_dir)?;
        if audio_files.is_empty() {
            return Err(anyhow!("No audio files found in directory: {:?}", input_dir));
        }

        let folder_pb = if options.show_progress {
            ProgressBar::new(audio_files.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} songs ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result);

        // Per-file spinners would fight with the folder bar
        let file_options = RunOptions {
            show_progress: false,
            ..options.clone()
        };

        let mut summary = FolderSummary::default();
        for audio_file in &audio_files {
            let file_name = audio_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_with(orchestrator, audio_file, &file_options).await {
                Ok(run) => match run.source {
                    ResultSource::Processed => summary.processed += 1,
                    ResultSource::Library => summary.replayed += 1,
                    ResultSource::Failed => summary.failed += 1,
                },
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} processed, {} replayed, {} failed, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.replayed,
            summary.failed,
            summary.errors
        );

        Ok(summary)
    }

    /// Write the requested exports next to the input or into the output directory
    fn write_outputs(&self, input_file: &Path, result: &ProcessingResult, options: &RunOptions) -> Result<Vec<PathBuf>> {
        let output_dir = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => input_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let language_tag = language_utils::short_code(&self.config.target_language)
            .unwrap_or_else(|_| self.config.target_language.to_lowercase());

        let mut outputs = Vec::with_capacity(options.formats.len());
        for format in &options.formats {
            let path = FileManager::generate_output_path(input_file, &output_dir, &language_tag, format.extension());
            FileManager::write_to_file(&path, &format.render(result)?)?;
            debug!("Wrote {:?}", path);
            outputs.push(path);
        }

        Ok(outputs)
    }

    fn spinner(visible: bool, file_name: &str) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(format!("Processing {}", file_name));
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Format a duration as a human-readable string
    pub fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        if total_secs >= 60 {
            format!("{}m {}s", total_secs / 60, total_secs % 60)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }
}
