//! Error types for dictofon.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictofonError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Codec errors — fatal to a run: without decodable audio there is
    // nothing to segment
    #[error("Codec tool not found: {tool}")]
    CodecToolNotFound { tool: String },

    #[error("Codec invocation failed: {message}")]
    CodecFailed { message: String },

    #[error("Failed to probe audio duration: {message}")]
    DurationProbe { message: String },

    // Segmentation errors — fatal to a run
    #[error("Segmentation failed: {message}")]
    Segmentation { message: String },

    // Transcription errors — contained at the segment boundary
    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("no speech recognized")]
    NoSpeechDetected,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl DictofonError {
    /// Whether this error aborts a whole pipeline run.
    ///
    /// Codec and segmentation failures leave nothing to transcribe.
    /// Everything else is handled at the segment boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DictofonError::CodecToolNotFound { .. }
                | DictofonError::CodecFailed { .. }
                | DictofonError::DurationProbe { .. }
                | DictofonError::Segmentation { .. }
        )
    }

    /// Whether another attempt could change the outcome.
    ///
    /// A definitive no-speech verdict never benefits from a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DictofonError::Transcription { .. })
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DictofonError>;
