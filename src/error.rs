//! Error types for the guided pose capture library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Frame source could not deliver frames; fatal to the session
    #[error("Frame source error: {0}")]
    FrameSource(String),

    /// Pose extractor failed on a single frame
    #[error("Pose extractor error: {0}")]
    Extractor(String),

    /// Image encoder could not produce an artifact
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Image encoding operation failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Calibration never observed a face before the outer timeout
    #[error("Calibration timed out after {0} ms without a usable face sample")]
    CalibrationTimeout(u64),

    /// Background sampler task failed
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Whether this error ends the session rather than a single tick
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FrameSource(_) | Self::CalibrationTimeout(_))
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
