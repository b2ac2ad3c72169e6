//! `configspec.yaml` support for OpenCLI generation.
//!
//! A [`SpecConfig`] supplies document info, output locations, conversion
//! policy and the document-level platforms, environment variables and tags
//! that a command tree cannot express on its own.

mod error;
mod spec_config;

pub use error::{ConfigError, Result};
pub use spec_config::{
    ContactConfig, EnvironmentConfig, InfoConfig, LicenseConfig, OptionsConfig, OutputConfig,
    PlatformConfig, SourceConfig, SpecConfig, TagConfig,
};
