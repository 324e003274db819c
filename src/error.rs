//! Error types for ZVF

use thiserror::Error;

/// Result type alias for ZVF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ZVF
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container/stream format error (Y4M parsing and writing)
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported clip format or dimensions
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The host and a filter disagree about the activation protocol
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Bad filter arguments or parameters
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error was raised while validating a filter's construction
    /// arguments or its input clip.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Unsupported(_))
    }
}
