use crate::errors::{FailureCategory, ServiceError};
use crate::lyrics::{LyricLine, ProcessingResult};

/// Length of each diagnostic line in seconds
pub const DIAGNOSTIC_LINE_SECS: f64 = 3.0;

/// Wording of the three diagnostic lines for a failure category
pub fn diagnostic_text(category: FailureCategory) -> [&'static str; 3] {
    match category {
        FailureCategory::Timeout => [
            "Processing timed out.",
            "The audio service took too long to respond.",
            "Try a shorter clip or try again later.",
        ],
        FailureCategory::Connectivity => [
            "Could not reach the audio service.",
            "Check that the processing servers are running.",
            "Then upload the song again.",
        ],
        FailureCategory::Generic => [
            "Processing failed.",
            "The service could not transcribe this audio.",
            "Try another file or try again later.",
        ],
    }
}

/// Three consecutive lines of `DIAGNOSTIC_LINE_SECS` each, starting at 0
pub fn diagnostic_lines(category: FailureCategory) -> Vec<LyricLine> {
    diagnostic_text(category)
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as f64 * DIAGNOSTIC_LINE_SECS;
            LyricLine::new(*text, start, start + DIAGNOSTIC_LINE_SECS)
        })
        .collect()
}

/// Result shown to the user when every stage failed
pub fn failure_result(error: &ServiceError, source_language: &str) -> ProcessingResult {
    let lines = diagnostic_lines(error.category());
    ProcessingResult {
        detected_language: source_language.to_string(),
        original_lyrics: lines.clone(),
        translated_lyrics: lines,
        analysis_text: error.to_string(),
        vocals_ref: None,
        background_ref: None,
    }
}
