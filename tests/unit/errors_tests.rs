/*!
 * Tests for error types and conversions
 */

use bilyric::errors::{AppError, FailureCategory, LibraryError, ServiceError};

#[test]
fn test_serviceError_timeout_shouldDisplayDeadline() {
    let error = ServiceError::Timeout { after_secs: 60 };
    let display = format!("{}", error);
    assert!(display.contains("timed out"));
    assert!(display.contains("60s"));
}

#[test]
fn test_serviceError_http_shouldDisplayStatusAndMessage() {
    let error = ServiceError::Http {
        status_code: 500,
        message: "Failed to process audio".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("500"));
    assert!(display.contains("Failed to process audio"));
}

#[test]
fn test_serviceError_allowsFallback_shouldOnlyRefuseSentinel() {
    assert!(ServiceError::Timeout { after_secs: 1 }.allows_fallback());
    assert!(ServiceError::Network("refused".into()).allows_fallback());
    assert!(ServiceError::Http { status_code: 503, message: String::new() }.allows_fallback());
    assert!(ServiceError::Parse("bad json".into()).allows_fallback());
    assert!(ServiceError::Rejected("no".into()).allows_fallback());
    assert!(!ServiceError::SentinelFailure("TRANSCRIPTION_FAILED".into()).allows_fallback());
}

#[test]
fn test_serviceError_category_shouldDistinguishTimeoutAndConnectivity() {
    assert_eq!(ServiceError::Timeout { after_secs: 5 }.category(), FailureCategory::Timeout);
    assert_eq!(ServiceError::Network("dns".into()).category(), FailureCategory::Connectivity);
    assert_eq!(
        ServiceError::Http { status_code: 502, message: String::new() }.category(),
        FailureCategory::Generic
    );
    assert_eq!(ServiceError::SentinelFailure("x".into()).category(), FailureCategory::Generic);
    assert_eq!(ServiceError::Parse("x".into()).category(), FailureCategory::Generic);
}

#[test]
fn test_libraryError_notFound_shouldDisplayId() {
    let error = LibraryError::NotFound("abc-123".to_string());
    assert!(error.to_string().contains("abc-123"));
}

#[test]
fn test_appError_fromServiceError_shouldWrapCorrectly() {
    let app_error: AppError = ServiceError::Rejected("bad upload".to_string()).into();
    match app_error {
        AppError::Service(inner) => assert_eq!(inner, ServiceError::Rejected("bad upload".to_string())),
        other => panic!("Expected service error, got {:?}", other),
    }
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing song");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
    assert!(app_error.to_string().contains("missing song"));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let app_error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(app_error, AppError::Unknown(_)));
}
