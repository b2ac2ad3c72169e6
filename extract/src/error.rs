//! Error types for the extraction pipeline.

use opencli_core::SpecError;
use thiserror::Error;

/// Errors raised by the [`Generator`](crate::Generator), manifest loading and
/// the output encoders.
///
/// Pipeline failures keep the stage that failed in the message and the
/// underlying [`SpecError`] as the source, so callers can still match on
/// the original kind through [`ExtractError::spec_error`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to find extractor: {0}")]
    Find(#[source] SpecError),

    #[error("failed to parse CLI: {0}")]
    Parse(#[source] SpecError),

    #[error("failed to convert to OpenCLI spec: {0}")]
    Convert(#[source] SpecError),

    #[error("extractor '{0}' is not registered")]
    ExtractorNotFound(String),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ExtractError {
    /// Returns the wrapped pipeline error, if this error came from a stage.
    pub fn spec_error(&self) -> Option<&SpecError> {
        match self {
            Self::Find(err) | Self::Parse(err) | Self::Convert(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
