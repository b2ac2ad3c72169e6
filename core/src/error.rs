//! Error types for extraction and conversion.
//!
//! Every failure is terminal for the current call: there is no partial-result
//! mode, and nothing is retried internally.

use thiserror::Error;

/// Errors raised by the extraction registry, extractors and the converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// No registered extractor accepted the source object.
    #[error("no suitable extractor found for source")]
    NoSuitableExtractor,

    /// An extractor was asked to parse a source it does not support.
    #[error("invalid source for extractor '{extractor}': expected {expected}")]
    InvalidSource {
        /// Name of the extractor that rejected the source.
        extractor: String,
        /// Human-readable name of the source type the extractor accepts.
        expected: &'static str,
    },

    /// The converter was given an empty intermediate model.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two commands resolved to the same hierarchical path.
    #[error("duplicate command path: {0}")]
    DuplicatePath(String),
}

/// Convenience alias for results with [`SpecError`].
pub type Result<T> = std::result::Result<T, SpecError>;
