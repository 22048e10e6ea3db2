use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

use crate::language_utils;

/// Settings read from `conf.json`: languages, service endpoints, timing
/// heuristics and the song library location. Every field has a default, so a
/// partial file is enough.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the uploaded audio (name or ISO code)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language to translate into (name or ISO code)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Processing service endpoints
    #[serde(default)]
    pub services: ServicesConfig,

    /// Caption timing rules
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Song library settings
    #[serde(default)]
    pub library: LibraryConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// External processing service type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    // @service: Combined transcribe + translate service
    Process,
    // @service: Transcription (and stem separation) service
    Transcribe,
    // @service: Text translation service
    Translate,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Process, ServiceKind::Transcribe, ServiceKind::Translate];

    // @returns: Capitalized service name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Process => "Process",
            Self::Transcribe => "Transcribe",
            Self::Translate => "Translate",
        }
    }

    // @returns: Lowercase service identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Process => "process".to_string(),
            Self::Transcribe => "transcribe".to_string(),
            Self::Translate => "translate".to_string(),
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "transcribe" => Ok(Self::Transcribe),
            "translate" => Ok(Self::Translate),
            _ => Err(anyhow!("Invalid service type: {}", s)),
        }
    }
}

/// Configuration of one processing service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    // @field: Full URL of the endpoint
    pub endpoint: String,

    // @field: Deadline for one call, in seconds
    pub timeout_secs: u64,

    // @field: Disabled services are skipped as if unreachable
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ServiceConfig {
    // @param kind: Service type
    // @returns: Service config with defaults
    pub fn new(kind: ServiceKind) -> Self {
        match kind {
            ServiceKind::Process => Self {
                endpoint: default_process_endpoint(),
                timeout_secs: default_process_timeout_secs(),
                enabled: true,
            },
            ServiceKind::Transcribe => Self {
                endpoint: default_transcribe_endpoint(),
                timeout_secs: default_transcribe_timeout_secs(),
                enabled: true,
            },
            ServiceKind::Translate => Self {
                endpoint: default_translate_endpoint(),
                timeout_secs: default_translate_timeout_secs(),
                enabled: true,
            },
        }
    }
}

/// Endpoints of all processing services
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServicesConfig {
    #[serde(default = "default_process_service")]
    pub process: ServiceConfig,

    #[serde(default = "default_transcribe_service")]
    pub transcribe: ServiceConfig,

    #[serde(default = "default_translate_service")]
    pub translate: ServiceConfig,
}

impl ServicesConfig {
    /// Get the configuration for one service
    pub fn get(&self, kind: ServiceKind) -> &ServiceConfig {
        match kind {
            ServiceKind::Process => &self.process,
            ServiceKind::Transcribe => &self.transcribe,
            ServiceKind::Translate => &self.translate,
        }
    }

    /// Mutable access, used by `--disable-service`
    pub fn get_mut(&mut self, kind: ServiceKind) -> &mut ServiceConfig {
        match kind {
            ServiceKind::Process => &mut self.process,
            ServiceKind::Transcribe => &mut self.transcribe,
            ServiceKind::Translate => &mut self.translate,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            process: default_process_service(),
            transcribe: default_transcribe_service(),
            translate: default_translate_service(),
        }
    }
}

/// Caption timing rules
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimelineConfig {
    /// Longest caption line in words
    #[serde(default = "default_max_words_per_line")]
    pub max_words_per_line: usize,

    /// Assumed speech rate used to time lines
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: f64,

    /// Duration used when neither the service nor the caller supplies one
    #[serde(default = "default_fallback_duration_secs")]
    pub fallback_duration_secs: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            max_words_per_line: default_max_words_per_line(),
            words_per_minute: default_words_per_minute(),
            fallback_duration_secs: default_fallback_duration_secs(),
        }
    }
}

/// Song library settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LibraryConfig {
    /// Whether results are stored and replayed
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database file; defaults to the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Spanish".to_string()
}

fn default_true() -> bool {
    true
}

fn default_process_endpoint() -> String {
    "http://localhost:8000/process-audio".to_string()
}

fn default_transcribe_endpoint() -> String {
    "http://localhost:3001/api/transcribe".to_string()
}

fn default_translate_endpoint() -> String {
    "http://localhost:3001/api/translate".to_string()
}

fn default_process_timeout_secs() -> u64 {
    60
}

fn default_transcribe_timeout_secs() -> u64 {
    300 // Transcription plus stem separation is slow
}

fn default_translate_timeout_secs() -> u64 {
    60
}

fn default_process_service() -> ServiceConfig {
    ServiceConfig::new(ServiceKind::Process)
}

fn default_transcribe_service() -> ServiceConfig {
    ServiceConfig::new(ServiceKind::Transcribe)
}

fn default_translate_service() -> ServiceConfig {
    ServiceConfig::new(ServiceKind::Translate)
}

fn default_max_words_per_line() -> usize {
    12
}

fn default_words_per_minute() -> f64 {
    150.0
}

fn default_fallback_duration_secs() -> f64 {
    12.0
}

impl Config {
    /// Read `path`, or write the defaults there first if it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {:?}", path))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("Config {:?} is not valid JSON", path));
        }

        warn!("No config at {:?}, writing defaults", path);
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write default config to {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }
        language_utils::validate_language(&self.source_language)
            .map_err(|e| anyhow!("Invalid source language: {}", e))?;
        language_utils::validate_language(&self.target_language)
            .map_err(|e| anyhow!("Invalid target language: {}", e))?;

        for kind in ServiceKind::ALL {
            let service = self.services.get(kind);
            Url::parse(&service.endpoint)
                .map_err(|e| anyhow!("Invalid {} endpoint '{}': {}", kind, service.endpoint, e))?;
            if service.timeout_secs == 0 {
                return Err(anyhow!("Timeout for the {} service must be greater than zero", kind));
            }
        }

        if self.timeline.max_words_per_line == 0 {
            return Err(anyhow!("max_words_per_line must be at least 1"));
        }
        if !(self.timeline.words_per_minute > 0.0) {
            return Err(anyhow!("words_per_minute must be greater than zero"));
        }
        if !(self.timeline.fallback_duration_secs > 0.0) {
            return Err(anyhow!("fallback_duration_secs must be greater than zero"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            services: ServicesConfig::default(),
            timeline: TimelineConfig::default(),
            library: LibraryConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
