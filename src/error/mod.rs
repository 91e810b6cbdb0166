//! Error handling module for ConvertX

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ConvertX operations
#[derive(Error, Debug)]
pub enum ConvertXError {
    /// Conversion engine failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration values are invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// History file could not be read or written
    #[error("History store error: {message}")]
    History { message: String },

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for ConvertX operations
pub type ConvertXResult<T> = std::result::Result<T, ConvertXError>;
