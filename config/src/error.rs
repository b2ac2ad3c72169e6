//! Error types for configuration loading and validation.

use thiserror::Error;

/// Errors that can occur while loading or validating a [`SpecConfig`].
///
/// [`SpecConfig`]: crate::SpecConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required field is missing or empty.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// An output format the encoders do not support.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
