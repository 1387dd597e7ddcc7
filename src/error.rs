//! Error types for the head pose amplitude library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A measurement that cannot enter the sample window (NaN, infinite or too large)
    #[error("Invalid sample: {0} is not finite or exceeds the accepted magnitude")]
    InvalidSample(f64),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Measurement source failed to produce a detection
    #[error("Measurement source error: {0}")]
    SourceError(String),

    /// Recorded detections could not be parsed
    #[error("Replay data format error: {0}")]
    ReplayFormatError(String),

    /// Tracking session could not be started or stopped cleanly
    #[error("Session error: {0}")]
    SessionError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
