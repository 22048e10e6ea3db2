/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;

use bilyric::app_config::{Config, LogLevel, ServiceConfig, ServiceKind};
use bilyric::pipeline::OrchestratorConfig;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "Spanish");
    assert_eq!(config.services.process.endpoint, "http://localhost:8000/process-audio");
    assert_eq!(config.services.transcribe.endpoint, "http://localhost:3001/api/transcribe");
    assert_eq!(config.services.translate.endpoint, "http://localhost:3001/api/translate");
    assert_eq!(config.services.transcribe.timeout_secs, 300);
    assert!(config.services.process.enabled);

    assert_eq!(config.timeline.max_words_per_line, 12);
    assert_eq!(config.timeline.words_per_minute, 150.0);
    assert_eq!(config.timeline.fallback_duration_secs, 12.0);
    assert!(config.library.enabled);
    assert!(config.library.path.is_none());

    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // ISO codes are accepted as well as names
    config.source_language = "en".to_string();
    config.target_language = "fre".to_string();
    assert!(config.validate().is_ok());

    config.source_language = "notalanguage".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "es".to_string();

    config.services.translate.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.services.translate.endpoint = "http://localhost:3001/api/translate".to_string();

    config.services.process.timeout_secs = 0;
    assert!(config.validate().is_err());
    config.services.process.timeout_secs = 60;

    config.timeline.max_words_per_line = 0;
    assert!(config.validate().is_err());
    config.timeline.max_words_per_line = 12;

    config.timeline.words_per_minute = 0.0;
    assert!(config.validate().is_err());
    config.timeline.words_per_minute = 150.0;

    config.timeline.fallback_duration_secs = -1.0;
    assert!(config.validate().is_err());
    config.timeline.fallback_duration_secs = 12.0;

    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "ja",
        "target_language": "en",
        "services": {
            "process": { "endpoint": "http://media:9000/process-audio", "timeout_secs": 30 }
        },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).expect("config should parse");

    assert_eq!(config.services.process.endpoint, "http://media:9000/process-audio");
    assert_eq!(config.services.process.timeout_secs, 30);
    assert!(config.services.process.enabled);
    assert_eq!(config.services.transcribe.endpoint, "http://localhost:3001/api/transcribe");
    assert_eq!(config.timeline.max_words_per_line, 12);
    assert!(config.library.enabled);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserialize_withoutLanguages_shouldUseDefaultLanguages() {
    let empty: Config = serde_json::from_str("{}").expect("empty config should parse");
    assert_eq!(empty.source_language, "English");
    assert_eq!(empty.target_language, "Spanish");

    let only_target: Config =
        serde_json::from_str(r#"{"target_language": "French"}"#).expect("partial config should parse");
    assert_eq!(only_target.source_language, "English");
    assert_eq!(only_target.target_language, "French");
    assert!(only_target.validate().is_ok());
}

#[test]
fn test_config_serialize_roundTrip_shouldPreserveServices() {
    let mut config = Config::default();
    config.services.translate.enabled = false;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert!(!parsed.services.translate.enabled);
    assert_eq!(parsed.services.process.endpoint, config.services.process.endpoint);
}

#[test]
fn test_serviceKind_parseAndDisplay_shouldBeCaseInsensitive() {
    assert_eq!("Process".parse::<ServiceKind>().unwrap(), ServiceKind::Process);
    assert_eq!("TRANSCRIBE".parse::<ServiceKind>().unwrap(), ServiceKind::Transcribe);
    assert!("whisper".parse::<ServiceKind>().is_err());
    assert_eq!(ServiceKind::Translate.to_string(), "translate");
    assert_eq!(ServiceKind::Translate.display_name(), "Translate");
}

#[test]
fn test_servicesConfig_getMut_shouldUpdateTheRightService() {
    let mut config = Config::default();
    config.services.get_mut(ServiceKind::Transcribe).timeout_secs = 5;

    assert_eq!(config.services.get(ServiceKind::Transcribe).timeout_secs, 5);
    assert_eq!(config.services.get(ServiceKind::Process).timeout_secs, 60);
    assert_eq!(
        ServiceConfig::new(ServiceKind::Process).endpoint,
        config.services.process.endpoint
    );
}

#[test]
fn test_servicesConfig_getMut_disablingProcess_shouldReachOrchestratorSettings() {
    let mut config = Config::default();
    config.services.get_mut(ServiceKind::Process).enabled = false;

    let settings = OrchestratorConfig::from_config(&config);

    assert!(!settings.process_enabled);
    assert!(settings.transcribe_enabled);
    assert!(settings.translate_enabled);
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaultsThenReadEdits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(created.target_language, "Spanish");

    std::fs::write(&path, r#"{"target_language": "French"}"#)?;
    let edited = Config::load_or_create(&path)?;
    assert_eq!(edited.target_language, "French");
    assert_eq!(edited.source_language, "English");

    std::fs::write(&path, "not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
