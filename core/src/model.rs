//! Intermediate model shared by extractors and the converter.
//!
//! Extractors walk a framework-specific command tree and realize it as a
//! [`ParsedCli`]. The converter only ever sees this model, never the source
//! framework's types.
//!
//! Commands are stored in an arena owned by [`ParsedCli`]. The parent link of
//! a [`CommandInfo`] is a [`CommandId`] into that arena: it is lookup-only and
//! never owns anything, so the model has no reference cycles.
//!
//! # Examples
//!
//! ```
//! use opencli_core::{CommandInfo, FlagInfo, ParsedCli};
//!
//! let mut root = CommandInfo::new("testapp");
//! root.add_flag(FlagInfo::new("verbose", "bool").persistent());
//!
//! let mut parsed = ParsedCli::with_root(root);
//! let root_id = parsed.root_id().unwrap();
//! let user = parsed.add_command(root_id, CommandInfo::new("user")).unwrap();
//! parsed.add_command(user, CommandInfo::new("create")).unwrap();
//!
//! assert_eq!(parsed.len(), 3);
//! assert!(parsed.get("testapp/user/create").is_some());
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};

/// Separator between segments of a command path.
pub const PATH_SEPARATOR: char = '/';

/// Joins a parent path and a command name.
///
/// The root command has an empty parent path, so its path is its bare name.
///
/// # Examples
///
/// ```
/// use opencli_core::join_path;
///
/// assert_eq!(join_path("", "git"), "git");
/// assert_eq!(join_path("git/remote", "add"), "git/remote/add");
/// ```
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}

/// Splits a comma-separated annotation value into trimmed, non-empty items.
///
/// # Examples
///
/// ```
/// use opencli_core::split_list;
///
/// assert_eq!(split_list(" admin, users ,,"), vec!["admin", "users"]);
/// ```
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// A framework-specific value stored in an extension bag.
///
/// Restricted to a small closed set of kinds so every bag serializes
/// uniformly in both output encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl From<bool> for ExtensionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ExtensionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ExtensionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExtensionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for ExtensionValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Extension bag keyed by string.
pub type Extensions = BTreeMap<String, ExtensionValue>;

/// Upper bound on the number of values a positional argument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxArgs {
    Bounded(usize),
    Unbounded,
}

impl MaxArgs {
    /// Returns the bound, or `None` when unbounded.
    pub fn bound(self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n),
            Self::Unbounded => None,
        }
    }
}

impl Default for MaxArgs {
    fn default() -> Self {
        Self::Bounded(0)
    }
}

/// Semantic category of an opaque argument-count validator.
///
/// Frameworks that validate positional arguments with a callback only expose
/// which kind of validator is attached, not its parameters. [`arity`]
/// maps each category to a conservative minimum/maximum.
///
/// [`arity`]: ArgsValidator::arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgsValidator {
    /// Rejects any positional argument.
    NoArgs,
    /// Requires an exact count.
    ///
    /// The count itself is not recoverable from the validator, so this maps
    /// to exactly one argument. That is a known approximation and is wrong
    /// for any other count.
    ExactArgs,
    /// Requires at least some count.
    MinimumArgs,
    /// Accepts at most some count.
    MaximumArgs,
    /// Requires a count within a range.
    RangeArgs,
    /// Accepts anything.
    Arbitrary,
}

impl ArgsValidator {
    /// Returns the `(min, max)` arity inferred for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use opencli_core::{ArgsValidator, MaxArgs};
    ///
    /// assert_eq!(ArgsValidator::NoArgs.arity(), (0, MaxArgs::Bounded(0)));
    /// assert_eq!(ArgsValidator::MinimumArgs.arity(), (1, MaxArgs::Unbounded));
    /// ```
    pub fn arity(self) -> (usize, MaxArgs) {
        match self {
            Self::NoArgs => (0, MaxArgs::Bounded(0)),
            Self::ExactArgs => (1, MaxArgs::Bounded(1)),
            Self::MinimumArgs => (1, MaxArgs::Unbounded),
            Self::MaximumArgs => (0, MaxArgs::Bounded(1)),
            Self::RangeArgs => (1, MaxArgs::Unbounded),
            Self::Arbitrary => (0, MaxArgs::Unbounded),
        }
    }
}

/// A command flag/option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagInfo {
    /// Long name without leading dashes (e.g. `verbose`).
    pub name: String,
    /// One-character short form, if any.
    pub shorthand: Option<char>,
    /// Help text.
    pub usage: String,
    /// Semantic type tag (`bool`, `int64`, `stringSlice`, ...).
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Default value as declared by the framework.
    pub default_value: Option<String>,
    pub required: bool,
    pub hidden: bool,
    /// Deprecation reason; `Some` means deprecated.
    pub deprecated: Option<String>,
    /// Inherited by every descendant command.
    pub persistent: bool,
    /// Allowed values for enum-like flags.
    pub valid_values: Vec<String>,
    pub annotations: BTreeMap<String, String>,
}

impl FlagInfo {
    /// Creates a local, optional, visible flag.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shorthand: None,
            usage: String::new(),
            type_tag: type_tag.into(),
            default_value: None,
            required: false,
            hidden: false,
            deprecated: None,
            persistent: false,
            valid_values: Vec::new(),
            annotations: BTreeMap::new(),
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
        self.default_value = Some(default.into());
        self
    }

    pub fn with_valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the flag as hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the flag as inherited by descendants.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// A positional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    pub name: String,
    pub description: Option<String>,
    /// 1-based position.
    pub position: usize,
    pub required: bool,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub min_args: usize,
    pub max_args: MaxArgs,
    pub valid_values: Vec<String>,
}

impl ArgumentInfo {
    /// Creates an optional string argument with no declared arity.
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            description: None,
            position,
            required: false,
            type_tag: "string".to_string(),
            min_args: 0,
            max_args: MaxArgs::default(),
            valid_values: Vec::new(),
        }
    }

    /// Returns `true` when a minimum or maximum occurrence count is declared.
    pub fn has_arity(&self) -> bool {
        self.min_args > 0 || self.max_args != MaxArgs::Bounded(0)
    }
}

/// Arena index of a command inside a [`ParsedCli`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommandId(usize);

impl CommandId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Everything known about one command.
///
/// `path`, the parent link and the child list are assigned by
/// [`ParsedCli::add_command`] so the path invariants hold by construction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandInfo {
    pub name: String,
    path: String,
    /// One-line usage string (e.g. `create <username>`).
    pub usage: String,
    pub short: Option<String>,
    pub long: Option<String>,
    pub example: Option<String>,
    pub aliases: Vec<String>,
    pub version: Option<String>,
    #[serde(skip)]
    parent: Option<CommandId>,
    #[serde(skip)]
    subcommands: Vec<CommandId>,
    pub flags: Vec<FlagInfo>,
    pub persistent_flags: Vec<FlagInfo>,
    pub args: Vec<ArgumentInfo>,
    pub hidden: bool,
    /// Deprecation reason; `Some` means deprecated.
    pub deprecated: Option<String>,
    /// Whether the command has a run action of its own.
    pub runnable: bool,
    pub annotations: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub extensions: Extensions,
}

impl CommandInfo {
    /// Creates an empty command with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Full `/`-joined path, root name first.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Arena id of the parent command, `None` for the root.
    pub fn parent_id(&self) -> Option<CommandId> {
        self.parent
    }

    /// Arena ids of the children, in discovery order.
    pub fn subcommand_ids(&self) -> &[CommandId] {
        &self.subcommands
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Adds a flag to the local or persistent set according to
    /// [`FlagInfo::persistent`].
    ///
    /// A name is recorded at most once per command. A persistent flag wins
    /// over a same-named local flag, whichever was added first.
    ///
    /// # Examples
    ///
    /// ```
    /// use opencli_core::{CommandInfo, FlagInfo};
    ///
    /// let mut cmd = CommandInfo::new("app");
    /// cmd.add_flag(FlagInfo::new("config", "string"));
    /// cmd.add_flag(FlagInfo::new("config", "string").persistent());
    ///
    /// assert!(cmd.flags.is_empty());
    /// assert_eq!(cmd.persistent_flags.len(), 1);
    /// ```
    pub fn add_flag(&mut self, flag: FlagInfo) {
        if flag.persistent {
            self.flags.retain(|f| f.name != flag.name);
            if !self.persistent_flags.iter().any(|f| f.name == flag.name) {
                self.persistent_flags.push(flag);
            }
        } else if !self
            .persistent_flags
            .iter()
            .chain(self.flags.iter())
            .any(|f| f.name == flag.name)
        {
            self.flags.push(flag);
        }
    }

    /// Finds a local or persistent flag by name.
    pub fn find_flag(&self, name: &str) -> Option<&FlagInfo> {
        self.flags
            .iter()
            .chain(self.persistent_flags.iter())
            .find(|f| f.name == name)
    }
}

/// An environment variable the CLI reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvVarInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
}

/// A supported operating system and its architectures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: String,
    #[serde(default)]
    pub architectures: Vec<String>,
}

/// A tag used to group commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Global CLI metadata, taken from the root command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliMetadata {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    pub env_vars: Vec<EnvVarInfo>,
    pub platforms: Vec<PlatformInfo>,
    pub tags: Vec<TagInfo>,
}

/// A parsed CLI: the command arena, a path index and global metadata.
///
/// The first command is always the root. An empty `ParsedCli` (the
/// [`Default`]) has no root and is rejected by the converter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedCli {
    commands: Vec<CommandInfo>,
    #[serde(skip)]
    index: HashMap<String, CommandId>,
    pub metadata: CliMetadata,
    /// Framework-specific data, opaque to the converter.
    pub framework_data: Extensions,
}

impl ParsedCli {
    /// Creates a model whose root is `root`; the root path is its name.
    pub fn with_root(mut root: CommandInfo) -> Self {
        root.path = join_path("", &root.name);
        root.parent = None;
        root.subcommands.clear();

        let id = CommandId(0);
        let mut index = HashMap::new();
        index.insert(root.path.clone(), id);

        Self {
            commands: vec![root],
            index,
            metadata: CliMetadata::default(),
            framework_data: Extensions::new(),
        }
    }

    /// Adds `command` as the last child of `parent` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidInput`] if `parent` is not in this model
    /// and [`SpecError::DuplicatePath`] if the resulting path is taken.
    pub fn add_command(&mut self, parent: CommandId, mut command: CommandInfo) -> Result<CommandId> {
        let parent_path = self
            .commands
            .get(parent.0)
            .map(|p| p.path.clone())
            .ok_or_else(|| SpecError::InvalidInput(format!("unknown parent id {}", parent.0)))?;

        let path = join_path(&parent_path, &command.name);
        if self.index.contains_key(&path) {
            return Err(SpecError::DuplicatePath(path));
        }

        let id = CommandId(self.commands.len());
        command.path = path.clone();
        command.parent = Some(parent);
        command.subcommands.clear();

        self.commands.push(command);
        self.commands[parent.0].subcommands.push(id);
        self.index.insert(path, id);
        Ok(id)
    }

    pub fn root_id(&self) -> Option<CommandId> {
        (!self.commands.is_empty()).then_some(CommandId(0))
    }

    pub fn root(&self) -> Option<&CommandInfo> {
        self.commands.first()
    }

    pub fn command(&self, id: CommandId) -> Option<&CommandInfo> {
        self.commands.get(id.0)
    }

    pub fn command_mut(&mut self, id: CommandId) -> Option<&mut CommandInfo> {
        self.commands.get_mut(id.0)
    }

    /// Looks a command up by its full path.
    pub fn get(&self, path: &str) -> Option<&CommandInfo> {
        self.index.get(path).and_then(|id| self.command(*id))
    }

    /// Resolves a path to its arena id.
    pub fn id_of(&self, path: &str) -> Option<CommandId> {
        self.index.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn parent(&self, command: &CommandInfo) -> Option<&CommandInfo> {
        command.parent.and_then(|id| self.command(id))
    }

    /// Children of `command`, in discovery order.
    pub fn subcommands<'a>(
        &'a self,
        command: &'a CommandInfo,
    ) -> impl Iterator<Item = &'a CommandInfo> + 'a {
        command
            .subcommands
            .iter()
            .filter_map(move |id| self.command(*id))
    }

    /// All commands, root first, then in discovery order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandInfo> {
        self.commands.iter()
    }

    /// All command paths, in discovery order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample() -> ParsedCli {
        let mut parsed = ParsedCli::with_root(CommandInfo::new("testapp"));
        let root = parsed.root_id().unwrap();
        let user = parsed.add_command(root, CommandInfo::new("user")).unwrap();
        parsed.add_command(user, CommandInfo::new("create")).unwrap();
        parsed.add_command(user, CommandInfo::new("delete")).unwrap();
        parsed.add_command(root, CommandInfo::new("server")).unwrap();
        parsed
    }

    #[test]
    fn test_root_path_is_bare_name() {
        let parsed = sample();
        let root = parsed.root().unwrap();
        assert_eq!(root.path(), "testapp");
        assert!(root.is_root());
        assert!(parsed.parent(root).is_none());
    }

    #[test]
    fn test_child_path_extends_parent_path() {
        let parsed = sample();
        for cmd in parsed.commands().filter(|c| !c.is_root()) {
            let parent = parsed.parent(cmd).unwrap();
            assert_eq!(cmd.path(), format!("{}/{}", parent.path(), cmd.name));
        }
    }

    #[test]
    fn test_index_covers_reachable_set() {
        let parsed = sample();

        let mut reachable = HashSet::new();
        let mut stack = vec![parsed.root().unwrap()];
        while let Some(cmd) = stack.pop() {
            assert!(reachable.insert(cmd.path().to_string()));
            stack.extend(parsed.subcommands(cmd));
        }

        let indexed: HashSet<String> = parsed.paths().map(String::from).collect();
        assert_eq!(reachable, indexed);
        assert_eq!(parsed.len(), 5);
    }

    #[test]
    fn test_subcommand_order_is_discovery_order() {
        let parsed = sample();
        let user = parsed.get("testapp/user").unwrap();
        let names: Vec<_> = parsed.subcommands(user).map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["create", "delete"]);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut parsed = sample();
        let root = parsed.root_id().unwrap();
        let err = parsed.add_command(root, CommandInfo::new("user")).unwrap_err();
        assert_eq!(err, SpecError::DuplicatePath("testapp/user".into()));
    }

    #[test]
    fn test_local_flag_shadowed_by_persistent() {
        let mut cmd = CommandInfo::new("app");
        cmd.add_flag(FlagInfo::new("config", "string").persistent());
        cmd.add_flag(FlagInfo::new("config", "string"));
        assert!(cmd.flags.is_empty());
        assert_eq!(cmd.persistent_flags.len(), 1);
        assert!(cmd.find_flag("config").unwrap().persistent);
    }

    #[test]
    fn test_validator_arity_table() {
        assert_eq!(ArgsValidator::ExactArgs.arity(), (1, MaxArgs::Bounded(1)));
        assert_eq!(ArgsValidator::MaximumArgs.arity(), (0, MaxArgs::Bounded(1)));
        assert_eq!(ArgsValidator::RangeArgs.arity(), (1, MaxArgs::Unbounded));
        assert_eq!(ArgsValidator::Arbitrary.arity(), (0, MaxArgs::Unbounded));
    }

    #[test]
    fn test_extension_value_serializes_untagged() {
        let mut ext = Extensions::new();
        ext.insert("use".into(), "create <name>".into());
        ext.insert("validator".into(), true.into());
        ext.insert("suggest".into(), vec!["make".to_string()].into());

        let json = serde_json::to_value(&ext).unwrap();
        assert_eq!(json["use"], "create <name>");
        assert_eq!(json["validator"], true);
        assert_eq!(json["suggest"][0], "make");
    }
}
