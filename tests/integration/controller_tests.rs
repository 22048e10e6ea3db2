/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::sync::Arc;

use bilyric::app_config::Config;
use bilyric::app_controller::{Controller, OutputFormat, ResultSource, RunOptions};
use bilyric::database::{Library, ResultStore};
use bilyric::errors::ServiceError;
use crate::common::{self, MockOrchestrator, MockProcess, MockTranscribe, MockTranslate};

fn working_orchestrator() -> (MockOrchestrator, MockProcess) {
    let process = MockProcess::responding(common::process_response(
        &[("Hello world.", 0.0, 2.0), ("Goodbye.", 2.0, 4.0)],
        &[("Hola mundo.", 0.0, 2.0), ("Adiós.", 2.0, 4.0)],
    ));
    let orchestrator = common::mock_orchestrator(
        process.clone(),
        MockTranscribe::unreachable(),
        MockTranslate::failing(ServiceError::Network("unused".to_string())),
    );
    (orchestrator, process)
}

fn quiet_options() -> RunOptions {
    RunOptions {
        show_progress: false,
        media_duration: Some(4.0),
        ..RunOptions::default()
    }
}

fn controller_with_library() -> Result<(Controller, Arc<Library>)> {
    let library = Arc::new(Library::new_in_memory()?);
    let controller = Controller::with_config(common::test_config())?.with_store(library.clone());
    Ok((controller, library))
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert!(controller.is_initialized());
    assert!(controller.store().is_none());
    Ok(())
}

#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.target_language = "not a language".to_string();
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_open_library_withDisabledLibrary_shouldReturnNone() -> Result<()> {
    assert!(Controller::open_library(&common::test_config())?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_run_withWorkingServices_shouldStoreAndExport() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "song.mp3", &common::fake_audio_bytes())?;
    let (controller, library) = controller_with_library()?;
    let (orchestrator, _) = working_orchestrator();
    let options = RunOptions {
        formats: vec![OutputFormat::Json, OutputFormat::Srt, OutputFormat::Lrc],
        ..quiet_options()
    };

    let summary = controller.run_with(&orchestrator, &input, &options).await?;

    assert_eq!(summary.source, ResultSource::Processed);
    assert_eq!(summary.outputs.len(), 3);
    assert_eq!(summary.outputs[0], temp_dir.path().join("song.es.json"));
    assert!(summary.outputs.iter().all(|p| p.exists()));

    let srt = std::fs::read_to_string(temp_dir.path().join("song.es.srt"))?;
    assert!(srt.contains("Hello world.\nHola mundo."));

    let song_id = summary.song_id.expect("song should be stored");
    let stored = library.load(&song_id).await?;
    assert_eq!(stored.name, "song.mp3");
    assert_eq!(stored.result, summary.result);
    assert_eq!(stored.target_language, "Spanish");
    Ok(())
}

#[tokio::test]
async fn test_run_withKnownSong_shouldReplayFromLibrary() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "song.mp3", &common::fake_audio_bytes())?;
    let (controller, _) = controller_with_library()?;
    let (orchestrator, process) = working_orchestrator();

    let first = controller.run_with(&orchestrator, &input, &quiet_options()).await?;
    let second = controller.run_with(&orchestrator, &input, &quiet_options()).await?;

    assert_eq!(first.source, ResultSource::Processed);
    assert_eq!(second.source, ResultSource::Library);
    assert_eq!(second.song_id, first.song_id);
    assert_eq!(second.result, first.result);
    assert!(second.report.is_none());
    assert_eq!(process.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withForce_shouldReprocessKnownSong() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "song.mp3", &common::fake_audio_bytes())?;
    let (controller, library) = controller_with_library()?;
    let (orchestrator, process) = working_orchestrator();

    controller.run_with(&orchestrator, &input, &quiet_options()).await?;
    let forced = RunOptions { force: true, ..quiet_options() };
    let second = controller.run_with(&orchestrator, &input, &forced).await?;

    assert_eq!(second.source, ResultSource::Processed);
    assert_eq!(process.request_count(), 2);
    assert_eq!(library.list().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_withAllServicesDown_shouldNotStoreOrExport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "song.mp3", &common::fake_audio_bytes())?;
    let (controller, library) = controller_with_library()?;
    let orchestrator = common::mock_orchestrator(
        MockProcess::unreachable(),
        MockTranscribe::unreachable(),
        MockTranslate::unreachable(),
    );

    let summary = controller.run_with(&orchestrator, &input, &quiet_options()).await?;

    assert_eq!(summary.source, ResultSource::Failed);
    assert_eq!(summary.result.original_lyrics.len(), 3);
    assert!(summary.outputs.is_empty());
    assert!(summary.song_id.is_none());
    assert!(library.list().await?.is_empty());
    assert!(!temp_dir.path().join("song.es.json").exists());
    Ok(())
}

/// Process service without a translation, so the translate service is always asked
fn untranslated_orchestrator(translate: MockTranslate) -> MockOrchestrator {
    let process = MockProcess::responding(common::process_response(
        &[("Hello world.", 0.0, 2.0), ("Goodbye.", 2.0, 4.0)],
        &[],
    ));
    common::mock_orchestrator(process, MockTranscribe::unreachable(), translate)
}

#[tokio::test]
async fn test_run_withFailedTranslation_shouldExportButNotStore() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "song.mp3", &common::fake_audio_bytes())?;
    let (controller, library) = controller_with_library()?;

    let broken = untranslated_orchestrator(MockTranslate::failing(ServiceError::Timeout { after_secs: 60 }));
    let first = controller.run_with(&broken, &input, &quiet_options()).await?;

    assert_eq!(first.source, ResultSource::Processed);
    assert_eq!(first.result.translated_lyrics[0].text, "[Spanish translation unavailable]");
    assert!(first.song_id.is_none());
    assert_eq!(first.outputs.len(), 1);
    assert!(library.list().await?.is_empty());

    let translate = MockTranslate::responding(common::translate_response("Hola mundo. Adiós."));
    let working = untranslated_orchestrator(translate.clone());
    let second = controller.run_with(&working, &input, &quiet_options()).await?;

    assert_eq!(second.source, ResultSource::Processed);
    assert_eq!(translate.request_count(), 1);
    assert_eq!(second.result.translated_lyrics[0].text, "Hola mundo.");
    assert!(second.song_id.is_some());
    assert_eq!(library.list().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withOutputDir_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "track.wav", &common::fake_audio_bytes())?;
    let out_dir = temp_dir.path().join("exports");
    let controller = Controller::with_config(common::test_config())?;
    let (orchestrator, _) = working_orchestrator();
    let options = RunOptions {
        output_dir: Some(out_dir.clone()),
        formats: vec![OutputFormat::Lrc],
        ..quiet_options()
    };

    let summary = controller.run_with(&orchestrator, &input, &options).await?;

    assert_eq!(summary.outputs, vec![out_dir.join("track.es.lrc")]);
    assert!(summary.song_id.is_none());
    let lrc = std::fs::read_to_string(out_dir.join("track.es.lrc"))?;
    assert!(lrc.contains("[00:00.00]Hello world. / Hola mundo."));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingOrNonAudioInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let text_file = common::create_test_file(temp_dir.path(), "notes.txt", b"la la la")?;
    let controller = Controller::new_for_test()?;
    let (orchestrator, process) = working_orchestrator();

    assert!(controller
        .run_with(&orchestrator, &temp_dir.path().join("missing.mp3"), &quiet_options())
        .await
        .is_err());
    assert!(controller.run_with(&orchestrator, &text_file, &quiet_options()).await.is_err());
    assert_eq!(process.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withMixedFiles_shouldCountOutcomes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a.mp3", b"first song")?;
    common::create_test_file(temp_dir.path(), "b.mp3", b"second song")?;
    common::create_test_file(temp_dir.path(), "cover.jpg", b"not audio")?;
    let (controller, _) = controller_with_library()?;
    let (orchestrator, process) = working_orchestrator();

    let first = controller.run_folder_with(&orchestrator, temp_dir.path(), &quiet_options()).await?;
    assert_eq!(first.processed, 2);
    assert_eq!(first.failed + first.errors + first.replayed, 0);

    let second = controller.run_folder_with(&orchestrator, temp_dir.path(), &quiet_options()).await?;
    assert_eq!(second.replayed, 2);
    assert_eq!(process.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withNoAudio_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.txt", b"nothing")?;
    let controller = Controller::new_for_test()?;
    let (orchestrator, _) = working_orchestrator();

    assert!(controller
        .run_folder_with(&orchestrator, temp_dir.path(), &quiet_options())
        .await
        .is_err());
    Ok(())
}

#[test]
fn test_format_duration_shouldSwitchToMinutes() {
    assert_eq!(Controller::format_duration(std::time::Duration::from_millis(2500)), "2.5s");
    assert_eq!(Controller::format_duration(std::time::Duration::from_secs(125)), "2m 5s");
}
