/*!
 * Error types for the bilyric application.
 *
 * This module contains the failure taxonomy for calls to the external
 * processing services, the persistence errors, and the application-wide
 * wrapper, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Outcome of a single call to an external processing service.
///
/// `Ok` is the success payload; every failure class is a `ServiceError` variant.
pub type ServiceCallOutcome<T> = Result<T, ServiceError>;

/// Errors that can occur when calling one of the processing services
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The call exceeded its deadline and was abandoned
    #[error("Request timed out after {after_secs}s")]
    Timeout {
        /// Deadline that was exceeded, in seconds
        after_secs: u64,
    },

    /// The service could not be reached
    #[error("Connection error: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status
    #[error("Service responded with error: {status_code} - {message}")]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error body returned by the service
        message: String,
    },

    /// The response body was not in the expected shape
    #[error("Failed to parse service response: {0}")]
    Parse(String),

    /// The service answered normally but signalled that transcription failed
    #[error("Transcription failed: {0}")]
    SentinelFailure(String),

    /// The service answered normally but reported `success: false`
    #[error("Service rejected the request: {0}")]
    Rejected(String),
}

/// User-facing failure category used to word diagnostic results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Timeout,
    Connectivity,
    Generic,
}

impl ServiceError {
    /// Whether a failure of the primary stage may fall back to the secondary stage.
    ///
    /// A sentinel failure ends the job at any stage.
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, ServiceError::SentinelFailure(_))
    }

    /// Map the error onto the category shown to the user
    pub fn category(&self) -> FailureCategory {
        match self {
            ServiceError::Timeout { .. } => FailureCategory::Timeout,
            ServiceError::Network(_) => FailureCategory::Connectivity,
            _ => FailureCategory::Generic,
        }
    }
}

/// Errors raised by the song library
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored result could not be (de)serialized
    #[error("Stored result is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No entry with the given id
    #[error("No library entry with id {0}")]
    NotFound(String),

    /// Database file or directory could not be created
    #[error("Library I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database has a schema version this build cannot migrate
    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// Blocking database task did not complete
    #[error("Database task failed: {0}")]
    Task(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a processing service
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error from the song library
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
