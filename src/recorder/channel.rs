//! Recording errors
//!
//! Shared by the action recorder, its persisted store, and the click capture
//! channel that feeds it.

use thiserror::Error;

/// Errors that can occur while capturing or persisting a recording
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Platform error: {0}")]
    PlatformError(String),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;
