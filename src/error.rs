//! Error types for the Pktime service.

use thiserror::Error;

/// Main error type for Pktime operations.
#[derive(Error, Debug)]
pub enum PktimeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pktime operations.
pub type Result<T> = std::result::Result<T, PktimeError>;
