//! Error handling for frqkit
//!
//! Format failures are always surfaced to the caller of the binary
//! constructor; analysis and cancellation failures propagate through task
//! futures and are handled at the orchestrator boundary.

use thiserror::Error;

/// Result type alias for frqkit operations
pub type Result<T> = std::result::Result<T, FrqError>;

/// Main error type for frqkit operations
#[derive(Error, Debug)]
pub enum FrqError {
    // Format Errors (malformed frq binary data)
    #[error("frq data too short: {len} bytes (minimum {min})")]
    TruncatedFrq { len: usize, min: usize },

    #[error("bad frq magic tag: expected \"FREQ0003\", found {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("frq point data truncated: {points} points need {expected} bytes, have {len}")]
    TruncatedPoints {
        points: usize,
        expected: usize,
        len: usize,
    },

    // Analysis Errors
    #[error("pitch analysis failed: {reason}")]
    AnalysisFailure { reason: String },

    // Scheduling Errors
    #[error("generation task canceled before dispatch")]
    Canceled,

    // Waveform Errors
    #[error("invalid waveform: {reason}")]
    InvalidWaveform {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FrqError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FrqError::TruncatedFrq { .. }
            | FrqError::BadMagic { .. }
            | FrqError::TruncatedPoints { .. } => "FORMAT_ERROR",
            FrqError::AnalysisFailure { .. } => "ANALYSIS_FAILURE",
            FrqError::Canceled => "CANCELED",
            FrqError::InvalidWaveform { .. } => "INVALID_WAVEFORM",
            FrqError::Io(_) => "IO_ERROR",
            FrqError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is a malformed-frq format error
    pub fn is_format_error(&self) -> bool {
        self.error_code() == "FORMAT_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = FrqError::TruncatedFrq { len: 12, min: 56 };
        assert_eq!(err.error_code(), "FORMAT_ERROR");
        assert!(err.is_format_error());

        let err = FrqError::Canceled;
        assert_eq!(err.error_code(), "CANCELED");
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_format_error_messages_name_the_defect() {
        let err = FrqError::BadMagic {
            found: b"RIFF0000".to_vec(),
        };
        assert!(err.to_string().contains("FREQ0003"));

        let err = FrqError::TruncatedPoints {
            points: 4,
            expected: 104,
            len: 80,
        };
        assert!(err.to_string().contains("104"));
    }
}
