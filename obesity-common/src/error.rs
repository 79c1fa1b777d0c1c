//! Common error types for the obesity predictor

use thiserror::Error;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the library and the HTTP service
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record failed domain validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model artifact missing or unreadable; prediction not attempted
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model artifact deserialized but is structurally unusable
    #[error("Model format error: {0}")]
    ModelFormat(String),

    /// Classifier failed while scoring a row
    #[error("Inference error: {0}")]
    Inference(String),
}
