//! Command tree extraction and OpenCLI document generation.
//!
//! This crate turns a live command definition into an [`OpenCliSpec`]
//! document. Extractors recognize framework-specific command objects and
//! build the intermediate [`ParsedCli`] model; the converter from
//! [`opencli_core`] then applies the output policy.
//!
//! # Main entry points
//!
//! - [`Generator`]: registry, converter and encoders behind one facade.
//! - [`ExtractorRegistry`]: name-keyed extractor selection by capability.
//! - [`manifest::CommandNode`]: declarative command trees loaded from YAML
//!   or JSON.
//! - [`clap_command::ClapExtractor`]: walks a [`clap::Command`] (feature
//!   `clap`, enabled by default).
//!
//! # Example
//!
//! ```
//! use opencli_core::ConvertOptions;
//! use opencli_extract::Generator;
//! use opencli_extract::manifest::{CommandNode, FlagNode};
//!
//! let tree = CommandNode::new("testapp")
//!     .with_persistent_flag(FlagNode::new("verbose", "bool").with_shorthand('v'))
//!     .with_subcommand(CommandNode::new("user").with_subcommand(CommandNode::new("create")));
//!
//! let spec = Generator::new()
//!     .convert(&tree, &ConvertOptions::default())
//!     .unwrap();
//! assert_eq!(spec.command_count(), 3);
//! assert_eq!(
//!     spec.command("/testapp/user/create").unwrap().operation_id.as_deref(),
//!     Some("userCreateCommand")
//! );
//! ```
//!
//! [`OpenCliSpec`]: opencli_core::OpenCliSpec
//! [`ParsedCli`]: opencli_core::ParsedCli

pub mod arguments;
#[cfg(feature = "clap")]
pub mod clap_command;
mod error;
mod generator;
pub mod manifest;
pub mod output;
mod registry;

pub use error::{ExtractError, Result};
pub use generator::Generator;
pub use output::OutputFormat;
pub use registry::{Extractor, ExtractorRegistry};
