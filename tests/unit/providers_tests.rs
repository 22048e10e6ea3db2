/*!
 * Tests for the HTTP service clients against wiremock services
 */

use anyhow::Result;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bilyric::errors::ServiceError;
use bilyric::providers::{
    AudioRequest, ProcessResponse, ProcessService, Provider, TranscribeResponse, TranscribeService,
    TranslateRequest, TranslateResponse, TranslateService,
};
use crate::common;

fn audio_request() -> AudioRequest {
    AudioRequest::new(common::sample_audio(), "English", "Spanish")
}

#[tokio::test]
async fn test_processService_withNestedLyrics_shouldDecodeBothTracks() -> Result<()> {
    common::init_logging();
    let server = common::json_service(
        "/process-audio",
        200,
        r#"{
            "success": true,
            "lyrics": {
                "originalLyrics": [
                    {"text": "Hello", "startTime": 0, "endTime": 2.5},
                    {"text": "World", "startTime": 2.5, "endTime": 5}
                ],
                "translatedLyrics": [
                    {"text": "Hola", "startTime": 0, "endTime": 2.5}
                ],
                "detectedLanguage": "English"
            },
            "vocalsPath": "/tmp/vocals.wav"
        }"#,
    )
    .await;
    let service = ProcessService::new(&common::service_config(&format!("{}/process-audio", server.uri())))?;

    let response = service.complete(audio_request()).await?;

    assert_eq!(response.detected_language.as_deref(), Some("English"));
    assert_eq!(response.original_lyrics.len(), 2);
    assert_eq!(response.original_lyrics[1].duration, 2.5);
    assert_eq!(response.translated_lyrics[0].text, "Hola");

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="file"; filename="song.mp3""#));
    assert!(body.contains(r#"name="inputLanguage""#));
    assert!(body.contains("Spanish"));
    Ok(())
}

#[test]
fn test_processResponse_withFlatSnakeCaseBody_shouldDecode() {
    let response = ProcessResponse::from_body(
        r#"{"original_lyrics":[{"text":"Hi","start":0,"end":1}],"detected_language":"English","vocals_path":"v.wav","audio_duration":1}"#,
    )
    .unwrap();

    assert_eq!(response.original_lyrics[0].duration, 1.0);
    assert!(response.translated_lyrics.is_empty());
    assert_eq!(response.vocals_ref.as_deref(), Some("v.wav"));
}

#[test]
fn test_processResponse_withUnusableBodies_shouldClassify() {
    assert!(matches!(
        ProcessResponse::from_body(r#"{"success": false, "error": "Failed to process audio"}"#),
        Err(ServiceError::Rejected(message)) if message == "Failed to process audio"
    ));
    assert!(matches!(
        ProcessResponse::from_body(r#"{"success": true, "lyrics": {"originalLyrics": []}}"#),
        Err(ServiceError::Parse(_))
    ));
    assert!(matches!(
        ProcessResponse::from_body(r#"{"originalLyrics":[{"text":"x","start":3,"end":1}]}"#),
        Err(ServiceError::Parse(_))
    ));
    assert!(matches!(ProcessResponse::from_body("<html>oops</html>"), Err(ServiceError::Parse(_))));
}

#[tokio::test]
async fn test_transcribeService_withTranscript_shouldDecodeAliases() -> Result<()> {
    let server = common::json_service(
        "/api/transcribe",
        200,
        r#"{"success":true,"transcription":" Hello world. ","translation":"Hola mundo.","detectedLanguage":"English","duration":10,"vocalsPath":"v.wav","backgroundPath":"b.wav"}"#,
    )
    .await;
    let service = TranscribeService::new(&common::service_config(&format!("{}/api/transcribe", server.uri())))?;

    let response = service.complete(audio_request()).await?;

    assert_eq!(response.transcription, "Hello world.");
    assert_eq!(response.translated_transcription.as_deref(), Some("Hola mundo."));
    assert_eq!(response.duration, Some(10.0));
    assert_eq!(response.background_ref.as_deref(), Some("b.wav"));
    let bodies = common::received_bodies(&server).await;
    assert!(bodies[0].contains(r#"name="outputLanguage""#));
    Ok(())
}

#[test]
fn test_transcribeResponse_withSentinel_shouldWinOverSuccessFlag() {
    let result = TranscribeResponse::from_body(
        r#"{"success":false,"transcription":"TRANSCRIPTION_FAILED","error":"whisper crashed"}"#,
    );
    assert_eq!(result, Err(ServiceError::SentinelFailure("whisper crashed".to_string())));

    let result = TranscribeResponse::from_body(r#"{"transcription":"TRANSCRIPTION_FAILED"}"#);
    assert!(matches!(result, Err(ServiceError::SentinelFailure(_))));
}

#[test]
fn test_transcribeResponse_withEmptyOrRejected_shouldClassify() {
    assert!(matches!(
        TranscribeResponse::from_body(r#"{"success":true,"transcription":"   "}"#),
        Err(ServiceError::Parse(_))
    ));
    assert!(matches!(
        TranscribeResponse::from_body(r#"{"success":false,"error":"No file uploaded"}"#),
        Err(ServiceError::Rejected(_))
    ));
    let response = TranscribeResponse::from_body(r#"{"text":"Hi.","duration":0}"#).unwrap();
    assert_eq!(response.duration, None);
}

#[tokio::test]
async fn test_translateService_shouldPostJsonAndDecode() -> Result<()> {
    let server = common::json_service(
        "/api/translate",
        200,
        r#"{"success":true,"translatedText":"<think>short</think>Hola"}"#,
    )
    .await;
    let service = TranslateService::new(&common::service_config(&format!("{}/api/translate", server.uri())))?;

    let response = service
        .complete(TranslateRequest::new("Hello", "English", "Spanish"))
        .await?;

    assert_eq!(response, TranslateResponse { translated_text: "<think>short</think>Hola".to_string() });
    let bodies = common::received_bodies(&server).await;
    let request = &bodies[0];
    assert!(request.contains(r#""text":"Hello""#));
    assert!(request.contains(r#""from_language":"English""#));
    assert!(request.contains(r#""to_language":"Spanish""#));
    Ok(())
}

#[test]
fn test_translateResponse_withMissingText_shouldBeParseError() {
    assert!(matches!(TranslateResponse::from_body(r#"{"success":true}"#), Err(ServiceError::Parse(_))));
    assert!(matches!(
        TranslateResponse::from_body(r#"{"success":false,"error":"model offline"}"#),
        Err(ServiceError::Rejected(_))
    ));
}

#[tokio::test]
async fn test_service_withServerError_shouldReturnHttpError() -> Result<()> {
    let server = common::json_service(
        "/process-audio",
        500,
        r#"{"error":"Failed to process audio","details":"ffmpeg missing"}"#,
    )
    .await;
    let service = ProcessService::new(&common::service_config(&format!("{}/process-audio", server.uri())))?;

    let error = service.complete(audio_request()).await.unwrap_err();

    match error {
        ServiceError::Http { status_code, message } => {
            assert_eq!(status_code, 500);
            assert!(message.contains("ffmpeg missing"));
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_service_withSlowServer_shouldTimeOut() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/translate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"translatedText":"late"}"#, "application/json")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let service = TranslateService::new(&common::service_config(&format!("{}/api/translate", server.uri())))?;

    let error = service
        .complete(TranslateRequest::new("Hello", "English", "Spanish"))
        .await
        .unwrap_err();

    assert_eq!(error, ServiceError::Timeout { after_secs: 1 });
    Ok(())
}

#[tokio::test]
async fn test_service_withNothingListening_shouldReturnNetworkError() -> Result<()> {
    let url = common::closed_port_url("/api/transcribe")?;
    let service = TranscribeService::new(&common::service_config(&url))?;

    let error = service.complete(audio_request()).await.unwrap_err();

    assert!(matches!(error, ServiceError::Network(_)), "got {:?}", error);
    assert!(service.test_connection().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_testConnection_shouldQueryHealthAtOrigin() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"status":"ok"}"#, "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    let service = TranslateService::new(&common::service_config(&format!("{}/api/translate", server.uri())))?;

    service.test_connection().await?;

    assert_eq!(service.client().health_url()?.path(), "/health");
    Ok(())
}
