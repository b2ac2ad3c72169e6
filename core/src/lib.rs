//! Core types and conversion for OpenCLI specification generation.
//!
//! This crate defines the two models of the pipeline and the step between
//! them:
//!
//! - the intermediate model ([`ParsedCli`], [`CommandInfo`], [`FlagInfo`],
//!   [`ArgumentInfo`], [`CliMetadata`]) that extractors produce from a live
//!   command tree,
//! - the OpenCLI document model ([`OpenCliSpec`] and friends) handed to the
//!   encoders,
//! - the [`Converter`] that turns one into the other under a
//!   [`ConvertOptions`] policy.
//!
//! # Example
//!
//! ```
//! use opencli_core::*;
//!
//! let mut root = CommandInfo::new("testapp");
//! root.add_flag(FlagInfo::new("verbose", "bool").with_shorthand('v').persistent());
//!
//! let mut parsed = ParsedCli::with_root(root);
//! parsed.metadata.name = "testapp".into();
//! let root_id = parsed.root_id().unwrap();
//! let user = parsed.add_command(root_id, CommandInfo::new("user")).unwrap();
//! parsed.add_command(user, CommandInfo::new("create")).unwrap();
//!
//! let spec = DefaultConverter.convert(&parsed, &ConvertOptions::default()).unwrap();
//! assert_eq!(spec.command_count(), 3);
//! assert_eq!(
//!     spec.command("/testapp/user/create").unwrap().operation_id.as_deref(),
//!     Some("userCreateCommand")
//! );
//! ```

mod convert;
mod error;
mod model;
mod spec;

pub use convert::{
    ConvertOptions, Converter, DefaultConverter, OPERATION_ID_SUFFIX, ROOT_OPERATION_ID,
    TagStrategy, command_key, operation_id, schema_type_for,
};
pub use error::{Result, SpecError};
pub use model::*;
pub use spec::*;
