//! Error types for SkyCity

use thiserror::Error;

/// The main error type for SkyCity setup operations.
///
/// Per-frame updates never produce errors; these only surface while loading
/// configuration or starting background workers.
#[derive(Debug, Error)]
pub enum SkyError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Result type alias for SkyCity operations
pub type Result<T> = std::result::Result<T, SkyError>;

impl From<toml::de::Error> for SkyError {
    fn from(err: toml::de::Error) -> Self {
        SkyError::TomlParseError(err.to_string())
    }
}
