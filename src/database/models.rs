/*!
 * Rows of the song library.
 *
 * A `SongRecord` is one processed song for one target language; the full
 * `ProcessingResult` rides along as JSON.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lyrics::ProcessingResult;

/// One processed song stored in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    /// Unique song identifier (UUID)
    pub id: String,
    /// Display name, usually the uploaded file name
    pub name: String,
    /// SHA256 hash of the uploaded audio
    pub file_hash: String,
    /// Language hint the song was processed with
    pub source_language: String,
    /// Language the song was translated into
    pub target_language: String,
    /// Language reported by the services
    pub detected_language: String,
    /// Marked as favorite by the user
    pub favorite: bool,
    /// Result replayed without re-running the pipeline
    pub result: ProcessingResult,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl SongRecord {
    /// Create a new song record with a fresh id
    pub fn new(
        name: impl Into<String>,
        file_hash: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        result: ProcessingResult,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            file_hash: file_hash.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            detected_language: result.detected_language.clone(),
            favorite: false,
            result,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Number of lines in the original track
    pub fn line_count(&self) -> usize {
        self.result.original_lyrics.len()
    }
}

impl fmt::Display for SongRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{} -> {}] {} lines, {:.1}s{}",
            &self.id[..8.min(self.id.len())],
            self.name,
            self.detected_language,
            self.target_language,
            self.line_count(),
            self.result.total_duration(),
            if self.favorite { " *" } else { "" }
        )
    }
}
