//! Error types for DSP operations.

use thiserror::Error;

/// Errors that can occur while turning a sweep into an impulse response.
#[derive(Debug, Error)]
pub enum DspError {
    /// Measurement is too short, non-increasing, or off a uniform grid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A frequency bin falls outside the allocated spectrum buffer.
    #[error("Bin index {index} out of range for buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Input length mismatch.
    #[error("Input length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Non-finite values reached a transform, or a transform rejected its input.
    #[error("Numeric error: {0}")]
    NumericError(String),
}

impl DspError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;
