//! Declarative command trees and the `manifest` extractor.
//!
//! A manifest is a plain-data description of a command hierarchy, written
//! by hand or exported by a framework that has no in-process extractor. It
//! carries the same hints such frameworks expose at runtime: separate local
//! and persistent flag sets, a closed list of valid arguments, and an
//! argument-count validator category instead of declared positionals.
//!
//! # Example
//!
//! ```
//! use opencli_extract::Extractor;
//! use opencli_extract::manifest::{CommandNode, ManifestExtractor};
//!
//! let tree = CommandNode::from_yaml_str(
//!     r#"
//! name: testapp
//! persistent_flags:
//!   - name: verbose
//!     type: bool
//! commands:
//!   - name: user
//!     commands:
//!       - name: create
//!         use: create <username>
//!         args: minimum_args
//! "#,
//! )
//! .unwrap();
//!
//! let parsed = ManifestExtractor.parse(&tree).unwrap();
//! assert_eq!(parsed.len(), 3);
//! assert_eq!(parsed.get("testapp/user/create").unwrap().args[0].name, "<username>");
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use opencli_core::{
    ArgsValidator, CliMetadata, CommandId, CommandInfo, ExtensionValue, FlagInfo, ParsedCli,
    SpecError, split_list,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arguments::derive_arguments;
use crate::error::Result;
use crate::registry::Extractor;

/// Registry name of [`ManifestExtractor`].
pub const MANIFEST_EXTRACTOR: &str = "manifest";

/// One command of a manifest tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandNode {
    /// Command name. When empty, the first word of `use` is the name.
    pub name: String,
    /// One-line usage, e.g. `create <username> [flags]`.
    #[serde(rename = "use")]
    pub usage: String,
    pub short: Option<String>,
    pub long: Option<String>,
    pub example: Option<String>,
    pub aliases: Vec<String>,
    pub version: Option<String>,
    pub hidden: bool,
    /// Deprecation message; present means deprecated.
    pub deprecated: Option<String>,
    /// Whether the command has an action. Defaults to "is a leaf".
    pub runnable: Option<bool>,
    pub annotations: BTreeMap<String, String>,
    /// Closed set of accepted positional values.
    pub valid_args: Vec<String>,
    /// Argument-count validator category.
    pub args: Option<ArgsValidator>,
    /// Misspellings that should suggest this command.
    pub suggest_for: Vec<String>,
    pub flags: Vec<FlagNode>,
    pub persistent_flags: Vec<FlagNode>,
    pub commands: Vec<CommandNode>,
}

/// One flag of a manifest command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagNode {
    pub name: String,
    pub shorthand: Option<char>,
    pub usage: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub default: Option<String>,
    pub required: bool,
    pub hidden: bool,
    pub deprecated: Option<String>,
    pub valid_values: Vec<String>,
    pub annotations: BTreeMap<String, String>,
}

impl Default for FlagNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            shorthand: None,
            usage: String::new(),
            type_tag: "string".to_string(),
            default: None,
            required: false,
            hidden: false,
            deprecated: None,
            valid_values: Vec::new(),
            annotations: BTreeMap::new(),
        }
    }
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a manifest tree from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a manifest tree from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a manifest tree from a file. `.json` files are read as JSON,
    /// anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let node = if is_json {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(node)
    }

    /// Effective command name.
    pub fn command_name(&self) -> &str {
        if self.name.is_empty() {
            self.usage.split_whitespace().next().unwrap_or_default()
        } else {
            &self.name
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn with_flag(mut self, flag: FlagNode) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_persistent_flag(mut self, flag: FlagNode) -> Self {
        self.persistent_flags.push(flag);
        self
    }

    pub fn with_args(mut self, validator: ArgsValidator) -> Self {
        self.args = Some(validator);
        self
    }

    pub fn with_valid_args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_args = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_subcommand(mut self, command: CommandNode) -> Self {
        self.commands.push(command);
        self
    }

    fn is_runnable(&self) -> bool {
        self.runnable.unwrap_or(self.commands.is_empty())
    }
}

impl FlagNode {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            ..Self::default()
        }
    }

    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn to_flag_info(&self, persistent: bool) -> FlagInfo {
        let required = self.required || self.annotations.contains_key("required");
        let valid_values = if self.valid_values.is_empty() {
            self.annotations
                .get("validValues")
                .map(|values| split_list(values))
                .unwrap_or_default()
        } else {
            self.valid_values.clone()
        };

        FlagInfo {
            name: self.name.clone(),
            shorthand: self.shorthand,
            usage: self.usage.clone(),
            type_tag: self.type_tag.clone(),
            default_value: self.default.clone(),
            required,
            hidden: self.hidden,
            deprecated: self.deprecated.clone(),
            persistent,
            valid_values,
            annotations: self.annotations.clone(),
        }
    }
}

/// Extractor for [`CommandNode`] trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestExtractor;

impl Extractor for ManifestExtractor {
    fn name(&self) -> &str {
        MANIFEST_EXTRACTOR
    }

    fn supports(&self, source: &dyn Any) -> bool {
        source.is::<CommandNode>()
    }

    fn parse(&self, source: &dyn Any) -> opencli_core::Result<ParsedCli> {
        let root = source
            .downcast_ref::<CommandNode>()
            .ok_or_else(|| SpecError::InvalidSource {
                extractor: MANIFEST_EXTRACTOR.to_string(),
                expected: "CommandNode",
            })?;

        let mut parsed = ParsedCli::with_root(command_info(root));
        if let Some(root_id) = parsed.root_id() {
            walk(&mut parsed, root_id, root)?;
        }

        parsed.metadata = metadata(root);
        parsed
            .framework_data
            .insert("framework".into(), MANIFEST_EXTRACTOR.into());
        parsed
            .framework_data
            .insert("version".into(), env!("CARGO_PKG_VERSION").into());

        info!(
            cli = %parsed.metadata.name,
            commands = parsed.len(),
            "Extracted manifest command tree"
        );
        Ok(parsed)
    }
}

fn walk(parsed: &mut ParsedCli, parent: CommandId, node: &CommandNode) -> opencli_core::Result<()> {
    for child in &node.commands {
        let id = parsed.add_command(parent, command_info(child))?;
        walk(parsed, id, child)?;
    }
    Ok(())
}

fn command_info(node: &CommandNode) -> CommandInfo {
    let mut info = CommandInfo::new(node.command_name());
    info.usage = node.usage.clone();
    info.short = node.short.clone();
    info.long = node.long.clone();
    info.example = node.example.clone();
    info.aliases = node.aliases.clone();
    info.version = node.version.clone();
    info.hidden = node.hidden;
    info.deprecated = node.deprecated.clone();
    info.runnable = node.is_runnable();
    info.annotations = node.annotations.clone();

    for flag in &node.persistent_flags {
        info.add_flag(flag.to_flag_info(true));
    }
    for flag in &node.flags {
        info.add_flag(flag.to_flag_info(false));
    }

    info.args = derive_arguments(&node.valid_args, node.args, &node.usage);
    if let Some(tags) = node.annotations.get("tags") {
        info.tags = split_list(tags);
    }

    if !node.usage.is_empty() {
        info.extensions
            .insert("manifest-use".into(), node.usage.clone().into());
    }
    if !node.suggest_for.is_empty() {
        info.extensions.insert(
            "manifest-suggest-for".into(),
            ExtensionValue::List(node.suggest_for.clone()),
        );
    }
    if let Some(Ok(serde_json::Value::String(category))) = node.args.map(serde_json::to_value) {
        info.extensions
            .insert("manifest-args-validator".into(), category.into());
    }

    debug!(
        command = %info.name,
        flags = info.flags.len(),
        persistent_flags = info.persistent_flags.len(),
        args = info.args.len(),
        "Extracted command"
    );
    info
}

fn metadata(root: &CommandNode) -> CliMetadata {
    let annotation = |key: &str| root.annotations.get(key).cloned();
    CliMetadata {
        name: root.command_name().to_string(),
        version: root.version.clone(),
        description: root.long.clone(),
        author: annotation("author"),
        license: annotation("license"),
        homepage: annotation("homepage"),
        repository: annotation("repository"),
        ..CliMetadata::default()
    }
}
