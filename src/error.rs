//! Error handling for Audiomark
//!
//! Every operation reports failures synchronously through `AudiomarkError`.
//! Nothing is retried or swallowed inside the library; the calling layer
//! decides what a failure means for its users.

use thiserror::Error;

/// Result type alias for Audiomark operations
pub type Result<T> = std::result::Result<T, AudiomarkError>;

/// Main error type for Audiomark operations
#[derive(Error, Debug)]
pub enum AudiomarkError {
    // Container errors
    #[error("Corrupt container: {reason}")]
    CorruptContainer { reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Buffer errors
    #[error("Invalid samples: {reason}")]
    InvalidSamples { reason: String },

    #[error("Insufficient samples: {operation} needs at least {required} frames, got {available}")]
    InsufficientSamples {
        operation: &'static str,
        required: usize,
        available: usize,
    },

    // Watermark errors
    #[error("Invalid bit pattern: {reason}")]
    InvalidBitPattern { reason: String },

    #[error("Watermark not found: expected {expected}, observed {observed}")]
    WatermarkNotFound { expected: String, observed: String },

    // Analysis / configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AudiomarkError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AudiomarkError::CorruptContainer { .. } => "CORRUPT_CONTAINER",
            AudiomarkError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AudiomarkError::InvalidSamples { .. } => "INVALID_SAMPLES",
            AudiomarkError::InsufficientSamples { .. } => "INSUFFICIENT_SAMPLES",
            AudiomarkError::InvalidBitPattern { .. } => "INVALID_BIT_PATTERN",
            AudiomarkError::WatermarkNotFound { .. } => "WATERMARK_NOT_FOUND",
            AudiomarkError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            AudiomarkError::Io(_) => "IO_ERROR",
            AudiomarkError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True when the failure was caused by the caller's input rather than
    /// the environment. A service layer maps these to 4xx responses.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AudiomarkError::Io(_))
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::CorruptContainer { .. } => "The file may be truncated or not a WAV file - re-export it from the source",
            Self::UnsupportedFormat { .. } => "Convert to 16/24-bit PCM WAV, mono or stereo, at 44.1 or 48 kHz",
            Self::InvalidSamples { .. } => "Check that every sample fits the declared bit depth",
            Self::InsufficientSamples { .. } => "Provide a longer recording or reduce the analysis window",
            Self::InvalidBitPattern { .. } => "Use a non-empty pattern with HIGH dB above LOW dB",
            Self::WatermarkNotFound { .. } => "The file was not watermarked with this pattern",
            Self::InvalidConfiguration { .. } => "Fix the configuration value named in the message",
            _ => "Check the error details and try again",
        }
    }
}
