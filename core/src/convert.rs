//! Conversion of a [`ParsedCli`] into an [`OpenCliSpec`].
//!
//! The converter applies a declared [`ConvertOptions`] policy: visibility
//! filtering, operation id synthesis, type mapping, response inference, tag
//! assignment and component extraction. Every step is a total function over
//! an already-built model; the only failure is an empty model.
//!
//! # Example
//!
//! ```
//! use opencli_core::{CommandInfo, ConvertOptions, Converter, DefaultConverter, ParsedCli};
//!
//! let mut parsed = ParsedCli::with_root(CommandInfo::new("mycli"));
//! let root = parsed.root_id().unwrap();
//! parsed.add_command(root, CommandInfo::new("init")).unwrap();
//!
//! let spec = DefaultConverter.convert(&parsed, &ConvertOptions::default()).unwrap();
//! assert!(spec.command("mycli").is_some());
//! assert_eq!(
//!     spec.command("/mycli/init").unwrap().operation_id.as_deref(),
//!     Some("initCommand")
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SpecError};
use crate::model::{ArgumentInfo, CliMetadata, CommandInfo, FlagInfo, PATH_SEPARATOR, ParsedCli};
use crate::spec::{
    Arity, Command, Components, Contact, EnvironmentVariable, Info, License, OPENCLI_VERSION,
    OpenCliSpec, Parameter, ParameterIn, Platform, Response, Schema, SchemaType, Scope, Tag,
};

/// Suffix appended to every synthesized operation id.
pub const OPERATION_ID_SUFFIX: &str = "Command";

/// Operation id of the root command.
pub const ROOT_OPERATION_ID: &str = "rootCommand";

const EXTENSION_PREFIX: &str = "x-";

/// How command tags are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStrategy {
    /// Declared tags; commands without any are tagged with their top-level
    /// group (the first path segment below the root).
    #[default]
    Auto,
    /// Declared tags only.
    Manual,
    /// No command tags.
    None,
}

impl FromStr for TagStrategy {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            "none" => Ok(Self::None),
            other => Err(SpecError::InvalidInput(format!(
                "unknown tag strategy '{other}' (expected auto, manual or none)"
            ))),
        }
    }
}

impl fmt::Display for TagStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

/// Conversion policy. All switches are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Value of the document's `opencli` field.
    pub spec_version: String,
    /// Keep hidden commands and hidden flags.
    pub include_hidden: bool,
    /// Keep deprecated commands.
    pub include_deprecated: bool,
    pub generate_operation_ids: bool,
    /// Attach generic success/failure responses to every command.
    pub infer_responses: bool,
    pub tag_strategy: TagStrategy,
    /// Populate the shared components section.
    pub extract_components: bool,
    /// Used verbatim instead of the info derived from metadata.
    pub custom_info: Option<Info>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            spec_version: OPENCLI_VERSION.to_string(),
            include_hidden: false,
            include_deprecated: true,
            generate_operation_ids: true,
            infer_responses: true,
            tag_strategy: TagStrategy::Auto,
            extract_components: true,
            custom_info: None,
        }
    }
}

/// Converts a parsed CLI into an OpenCLI document.
pub trait Converter: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidInput`] when `parsed` has no commands.
    fn convert(&self, parsed: &ParsedCli, options: &ConvertOptions) -> Result<OpenCliSpec>;
}

/// The standard converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl Converter for DefaultConverter {
    fn convert(&self, parsed: &ParsedCli, options: &ConvertOptions) -> Result<OpenCliSpec> {
        if parsed.is_empty() {
            return Err(SpecError::InvalidInput(
                "parsed CLI has no root command".to_string(),
            ));
        }

        let metadata = &parsed.metadata;
        let mut spec = OpenCliSpec {
            opencli: options.spec_version.clone(),
            info: convert_info(metadata, options),
            tags: metadata
                .tags
                .iter()
                .map(|t| Tag {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    external_docs: None,
                })
                .collect(),
            environment: metadata
                .env_vars
                .iter()
                .map(|e| EnvironmentVariable {
                    name: e.name.clone(),
                    description: e.description.clone(),
                    required: e.required,
                    default: e.default.clone(),
                })
                .collect(),
            platforms: metadata
                .platforms
                .iter()
                .map(|p| Platform {
                    name: p.os.clone(),
                    architectures: p.architectures.clone(),
                })
                .collect(),
            ..Default::default()
        };

        for command in parsed.commands() {
            if !is_included(command, options) {
                debug!(path = command.path(), "Omitting filtered command");
                continue;
            }
            spec.commands
                .insert(command_key(command), convert_command(command, options));
        }

        if options.extract_components {
            spec.components = Some(extract_components(parsed));
        }

        debug!(
            commands = spec.commands.len(),
            omitted = parsed.len() - spec.commands.len(),
            "Converted parsed CLI"
        );
        Ok(spec)
    }
}

/// Returns the document key of a command.
///
/// The root is keyed by its bare name; every other command by its path with
/// a leading `/`.
pub fn command_key(command: &CommandInfo) -> String {
    if command.is_root() {
        command.name.clone()
    } else {
        format!("{PATH_SEPARATOR}{}", command.path())
    }
}

/// Synthesizes an operation id from a command path.
///
/// The root segment is dropped; the next segment is lower-cased, every
/// following segment title-cased, and [`OPERATION_ID_SUFFIX`] appended. The
/// root itself yields [`ROOT_OPERATION_ID`].
///
/// # Examples
///
/// ```
/// use opencli_core::operation_id;
///
/// assert_eq!(operation_id("testapp/user/create"), "userCreateCommand");
/// assert_eq!(operation_id("testapp"), "rootCommand");
/// ```
pub fn operation_id(path: &str) -> String {
    let mut segments = path
        .trim_matches(PATH_SEPARATOR)
        .split(PATH_SEPARATOR)
        .skip(1)
        .filter(|s| !s.is_empty());

    let Some(first) = segments.next() else {
        return ROOT_OPERATION_ID.to_string();
    };

    let mut id = first.to_lowercase();
    for segment in segments {
        id.push_str(&title_case(segment));
    }
    id.push_str(OPERATION_ID_SUFFIX);
    id
}

/// Maps a semantic type tag to a schema type.
///
/// Unrecognized tags map to [`SchemaType::String`].
///
/// # Examples
///
/// ```
/// use opencli_core::{SchemaType, schema_type_for};
///
/// assert_eq!(schema_type_for("uint16"), SchemaType::Integer);
/// assert_eq!(schema_type_for("stringSlice"), SchemaType::Array);
/// assert_eq!(schema_type_for("ipNet"), SchemaType::String);
/// ```
pub fn schema_type_for(type_tag: &str) -> SchemaType {
    match type_tag.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => SchemaType::Boolean,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "count" => SchemaType::Integer,
        "float" | "float32" | "float64" => SchemaType::Number,
        "duration" | "string" => SchemaType::String,
        "stringslice" | "[]string" => SchemaType::Array,
        _ => SchemaType::String,
    }
}

fn is_included(command: &CommandInfo, options: &ConvertOptions) -> bool {
    if command.hidden && !options.include_hidden {
        return false;
    }
    if command.is_deprecated() && !options.include_deprecated {
        return false;
    }
    true
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn convert_info(metadata: &CliMetadata, options: &ConvertOptions) -> Info {
    if let Some(info) = &options.custom_info {
        return info.clone();
    }

    let author = non_empty(&metadata.author);
    let homepage = non_empty(&metadata.homepage);
    let contact = (author.is_some() || homepage.is_some()).then(|| Contact {
        name: author,
        url: homepage,
        email: None,
    });

    Info {
        title: metadata.name.clone(),
        description: non_empty(&metadata.description),
        version: metadata.version.clone().unwrap_or_default(),
        contact,
        license: non_empty(&metadata.license).map(|name| License { name, url: None }),
    }
}

fn convert_command(command: &CommandInfo, options: &ConvertOptions) -> Command {
    let visible = |flag: &&FlagInfo| options.include_hidden || !flag.hidden;

    let local = command
        .flags
        .iter()
        .filter(|f| !command.persistent_flags.iter().any(|p| p.name == f.name))
        .filter(visible)
        .map(|f| convert_flag(f, Scope::Local));
    let inherited = command
        .persistent_flags
        .iter()
        .filter(visible)
        .map(|f| convert_flag(f, Scope::Inherited));
    let arguments = command.args.iter().map(convert_argument);

    Command {
        summary: non_empty(&command.short),
        description: non_empty(&command.long),
        operation_id: options
            .generate_operation_ids
            .then(|| operation_id(command.path())),
        aliases: command.aliases.clone(),
        tags: command_tags(command, options.tag_strategy),
        parameters: local.chain(inherited).chain(arguments).collect(),
        responses: if options.infer_responses {
            default_responses()
        } else {
            Default::default()
        },
        deprecated: command.is_deprecated(),
        hidden: command.hidden,
        extensions: command
            .extensions
            .iter()
            .map(|(key, value)| (extension_key(key), value.clone()))
            .collect(),
    }
}

fn command_tags(command: &CommandInfo, strategy: TagStrategy) -> Vec<String> {
    match strategy {
        TagStrategy::None => Vec::new(),
        TagStrategy::Manual => command.tags.clone(),
        TagStrategy::Auto if !command.tags.is_empty() => command.tags.clone(),
        TagStrategy::Auto => command
            .path()
            .split(PATH_SEPARATOR)
            .nth(1)
            .map(|group| vec![group.to_string()])
            .unwrap_or_default(),
    }
}

fn extension_key(key: &str) -> String {
    if key.starts_with(EXTENSION_PREFIX) {
        key.to_string()
    } else {
        format!("{EXTENSION_PREFIX}{key}")
    }
}

fn convert_flag(flag: &FlagInfo, scope: Scope) -> Parameter {
    Parameter {
        name: flag.name.clone(),
        location: ParameterIn::Flag,
        alias: flag.shorthand.map(|c| c.to_string()).into_iter().collect(),
        description: Some(flag.usage.clone()).filter(|u| !u.is_empty()),
        required: flag.required,
        scope,
        position: None,
        schema: Some(create_schema(
            &flag.type_tag,
            flag.default_value.as_deref(),
            &flag.valid_values,
        )),
        arity: None,
        deprecated: flag.deprecated.is_some(),
        hidden: flag.hidden,
    }
}

fn convert_argument(arg: &ArgumentInfo) -> Parameter {
    Parameter {
        name: arg.name.clone(),
        location: ParameterIn::Argument,
        alias: Vec::new(),
        description: non_empty(&arg.description),
        required: arg.required,
        scope: Scope::Local,
        position: Some(arg.position),
        schema: Some(create_schema(&arg.type_tag, None, &arg.valid_values)),
        arity: arg.has_arity().then(|| Arity {
            min: arg.min_args,
            max: arg.max_args.bound().filter(|&n| n > 0),
        }),
        deprecated: false,
        hidden: false,
    }
}

fn create_schema(type_tag: &str, default: Option<&str>, valid_values: &[String]) -> Schema {
    let schema_type = schema_type_for(type_tag);
    Schema {
        schema_type: Some(schema_type),
        enum_values: valid_values.iter().cloned().map(Value::String).collect(),
        default: default.and_then(|raw| coerce_default(raw, schema_type)),
        items: (schema_type == SchemaType::Array).then(|| Box::new(Schema::of(SchemaType::String))),
        ..Default::default()
    }
}

/// Turns a textual default into a typed value when it parses as the schema
/// type; otherwise keeps the text.
fn coerce_default(raw: &str, schema_type: SchemaType) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let typed = match schema_type {
        SchemaType::Boolean => trimmed.parse::<bool>().ok().map(Value::Bool),
        SchemaType::Integer => trimmed.parse::<i64>().ok().map(Value::from),
        SchemaType::Number => trimmed
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        SchemaType::Array => {
            let inner = trimmed.trim_start_matches('[').trim_end_matches(']');
            Some(Value::Array(
                crate::model::split_list(inner)
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ))
        }
        SchemaType::String => None,
    };
    Some(typed.unwrap_or_else(|| Value::String(raw.to_string())))
}

fn default_responses() -> std::collections::BTreeMap<String, Response> {
    [
        (
            "0".to_string(),
            Response::text(
                "Command executed successfully",
                "Operation completed successfully",
            ),
        ),
        (
            "1".to_string(),
            Response::text("Command execution failed", "Error: operation failed"),
        ),
    ]
    .into_iter()
    .collect()
}

/// Lifts local flags that appear on more than one command into
/// `components.parameters`. The flags stay inline on their commands.
fn extract_components(parsed: &ParsedCli) -> Components {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&FlagInfo> = Vec::new();

    for command in parsed.commands() {
        for flag in &command.flags {
            let count = counts.entry(flag.name.as_str()).or_insert(0);
            if *count == 0 {
                first_seen.push(flag);
            }
            *count += 1;
        }
    }

    let mut components = Components::default();
    for flag in first_seen {
        if counts.get(flag.name.as_str()).copied().unwrap_or(0) > 1 {
            components
                .parameters
                .insert(flag.name.clone(), convert_flag(flag, Scope::Local));
        }
    }

    components.responses.insert(
        "Success".to_string(),
        Response::text("Operation completed successfully", "Success"),
    );
    components.responses.insert(
        "Error".to_string(),
        Response::text("Operation failed", "Error: operation failed"),
    );
    components
}

fn title_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut at_word_start = true;
    for c in segment.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArgumentInfo, CommandId, MaxArgs, TagInfo};

    /// testapp (verbose, config persistent) → user → create (username).
    fn testapp() -> ParsedCli {
        let mut root = CommandInfo::new("testapp");
        root.short = Some("A test application".into());
        root.version = Some("1.0.0".into());
        root.add_flag(
            FlagInfo::new("verbose", "bool")
                .with_shorthand('v')
                .with_default("false")
                .persistent(),
        );
        root.add_flag(FlagInfo::new("config", "string").with_shorthand('c').persistent());

        let mut parsed = ParsedCli::with_root(root);
        parsed.metadata.name = "testapp".into();
        parsed.metadata.version = Some("1.0.0".into());

        let root = parsed.root_id().unwrap();
        let user = parsed.add_command(root, CommandInfo::new("user")).unwrap();

        let mut create = CommandInfo::new("create");
        create.add_flag(FlagInfo::new("username", "string").with_shorthand('u'));
        parsed.add_command(user, create).unwrap();
        parsed
    }

    fn add(parsed: &mut ParsedCli, parent: &str, command: CommandInfo) -> CommandId {
        let parent = parsed.id_of(parent).unwrap();
        parsed.add_command(parent, command).unwrap()
    }

    fn convert(parsed: &ParsedCli, options: &ConvertOptions) -> OpenCliSpec {
        DefaultConverter.convert(parsed, options).unwrap()
    }

    #[test]
    fn test_round_trip_shape() {
        let spec = convert(&testapp(), &ConvertOptions::default());

        assert_eq!(spec.command_count(), 3);
        assert_eq!(spec.info.title, "testapp");
        assert_eq!(spec.info.version, "1.0.0");

        let root = spec.command("testapp").unwrap();
        for name in ["verbose", "config"] {
            let param = root.parameter(name, ParameterIn::Flag).unwrap();
            assert_eq!(param.scope, Scope::Inherited);
        }

        let create = spec.command("/testapp/user/create").unwrap();
        assert_eq!(create.operation_id.as_deref(), Some("userCreateCommand"));
        assert_eq!(
            create.parameter("username", ParameterIn::Flag).unwrap().scope,
            Scope::Local
        );
        assert_eq!(
            spec.command("/testapp/user").unwrap().operation_id.as_deref(),
            Some("userCommand")
        );
        assert_eq!(root.operation_id.as_deref(), Some(ROOT_OPERATION_ID));
    }

    #[test]
    fn test_root_key_has_no_leading_separator() {
        let spec = convert(&testapp(), &ConvertOptions::default());
        let keys: Vec<_> = spec.commands.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/testapp/user", "/testapp/user/create", "testapp"]);
    }

    #[test]
    fn test_parameter_order_local_inherited_arguments() {
        let mut root = CommandInfo::new("app");
        root.add_flag(FlagInfo::new("global", "bool").persistent());
        root.add_flag(FlagInfo::new("local", "string"));
        let mut arg = ArgumentInfo::new("file", 1);
        arg.required = true;
        arg.min_args = 1;
        arg.max_args = MaxArgs::Bounded(1);
        root.args.push(arg);

        let spec = convert(&ParsedCli::with_root(root), &ConvertOptions::default());
        let params = &spec.command("app").unwrap().parameters;

        let order: Vec<_> = params
            .iter()
            .map(|p| (p.name.as_str(), p.location, p.scope))
            .collect();
        assert_eq!(
            order,
            vec![
                ("local", ParameterIn::Flag, Scope::Local),
                ("global", ParameterIn::Flag, Scope::Inherited),
                ("file", ParameterIn::Argument, Scope::Local),
            ]
        );
        assert_eq!(params[2].position, Some(1));
        assert_eq!(params[2].arity, Some(Arity { min: 1, max: Some(1) }));
    }

    #[test]
    fn test_flag_in_both_sets_reported_once_as_inherited() {
        let mut root = CommandInfo::new("app");
        root.persistent_flags
            .push(FlagInfo::new("config", "string").persistent());
        // Bypass add_flag to simulate a model that violates the invariant.
        root.flags.push(FlagInfo::new("config", "string"));

        let spec = convert(&ParsedCli::with_root(root), &ConvertOptions::default());
        let matching: Vec<_> = spec.command("app").unwrap()
            .parameters
            .iter()
            .filter(|p| p.name == "config")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].scope, Scope::Inherited);
    }

    #[test]
    fn test_hidden_commands_never_leak() {
        let mut parsed = testapp();
        let mut hidden = CommandInfo::new("internal");
        hidden.hidden = true;
        let internal = add(&mut parsed, "testapp/user", hidden);
        parsed
            .add_command(internal, CommandInfo::new("debug"))
            .unwrap();
        let mut deep = CommandInfo::new("secret");
        deep.hidden = true;
        add(&mut parsed, "testapp/user/create", deep);

        let spec = convert(&parsed, &ConvertOptions::default());
        let hidden_paths: Vec<String> = parsed
            .commands()
            .filter(|c| c.hidden)
            .map(command_key)
            .collect();
        for key in &hidden_paths {
            assert!(!spec.commands.contains_key(key), "{key} leaked");
        }
        // The visible child of a hidden command is kept: filtering is per command.
        assert!(spec.commands.contains_key("/testapp/user/internal/debug"));

        let again: Vec<_> = spec.commands.values().filter(|c| c.hidden).collect();
        assert!(again.is_empty());

        let with_hidden = convert(
            &parsed,
            &ConvertOptions {
                include_hidden: true,
                ..Default::default()
            },
        );
        assert_eq!(with_hidden.command_count(), parsed.len());
    }

    #[test]
    fn test_hidden_and_deprecated_filters_are_independent() {
        let mut parsed = testapp();
        let mut hidden = CommandInfo::new("hidden");
        hidden.hidden = true;
        add(&mut parsed, "testapp", hidden);
        let mut old = CommandInfo::new("old");
        old.deprecated = Some("use user".into());
        add(&mut parsed, "testapp", old);

        for include_deprecated in [true, false] {
            let spec = convert(
                &parsed,
                &ConvertOptions {
                    include_hidden: false,
                    include_deprecated,
                    ..Default::default()
                },
            );
            assert!(!spec.commands.contains_key("/testapp/hidden"));
            assert_eq!(spec.commands.contains_key("/testapp/old"), include_deprecated);
        }

        for include_hidden in [true, false] {
            let spec = convert(
                &parsed,
                &ConvertOptions {
                    include_hidden,
                    include_deprecated: false,
                    ..Default::default()
                },
            );
            assert!(!spec.commands.contains_key("/testapp/old"));
            assert_eq!(spec.commands.contains_key("/testapp/hidden"), include_hidden);
        }
    }

    #[test]
    fn test_hidden_flags_filtered_individually() {
        let mut root = CommandInfo::new("app");
        root.add_flag(FlagInfo::new("visible", "bool"));
        root.add_flag(FlagInfo::new("secret", "bool").hidden());
        let parsed = ParsedCli::with_root(root);

        let spec = convert(&parsed, &ConvertOptions::default());
        let names: Vec<_> = spec.command("app").unwrap().parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["visible"]);

        let spec = convert(
            &parsed,
            &ConvertOptions {
                include_hidden: true,
                ..Default::default()
            },
        );
        assert_eq!(spec.command("app").unwrap().parameters.len(), 2);
    }

    #[test]
    fn test_components_lift_repeated_flags_once() {
        let mut parsed = testapp();
        let mut delete = CommandInfo::new("delete");
        delete.add_flag(FlagInfo::new("username", "string"));
        delete.add_flag(FlagInfo::new("force", "bool"));
        add(&mut parsed, "testapp/user", delete);

        let spec = convert(&parsed, &ConvertOptions::default());
        let components = spec.components.unwrap();

        assert_eq!(components.parameters.len(), 1);
        assert!(components.parameters.contains_key("username"));
        assert!(!components.parameters.contains_key("force"));
        assert!(components.responses.contains_key("Success"));
        assert!(components.responses.contains_key("Error"));

        // Repeated flags stay inline.
        let create = spec.commands.get("/testapp/user/create").unwrap();
        assert!(create.parameter("username", ParameterIn::Flag).is_some());
    }

    #[test]
    fn test_components_disabled() {
        let spec = convert(
            &testapp(),
            &ConvertOptions {
                extract_components: false,
                ..Default::default()
            },
        );
        assert!(spec.components.is_none());
    }

    #[test]
    fn test_responses_follow_policy() {
        let spec = convert(&testapp(), &ConvertOptions::default());
        let root = spec.command("testapp").unwrap();
        assert_eq!(root.responses.len(), 2);
        assert!(root.responses.contains_key("0"));
        assert!(root.responses.contains_key("1"));

        let spec = convert(
            &testapp(),
            &ConvertOptions {
                infer_responses: false,
                generate_operation_ids: false,
                ..Default::default()
            },
        );
        let root = spec.command("testapp").unwrap();
        assert!(root.responses.is_empty());
        assert!(root.operation_id.is_none());
    }

    #[test]
    fn test_type_mapping_and_default_coercion() {
        let mut root = CommandInfo::new("app");
        root.add_flag(FlagInfo::new("count", "int64").with_default("42"));
        root.add_flag(FlagInfo::new("ratio", "float64").with_default("0.5"));
        root.add_flag(FlagInfo::new("dry-run", "bool").with_default("false"));
        root.add_flag(FlagInfo::new("timeout", "duration").with_default("30s"));
        root.add_flag(FlagInfo::new("tags", "stringSlice").with_default("[a,b]"));
        root.add_flag(
            FlagInfo::new("format", "string")
                .with_default("json")
                .with_valid_values(["json", "yaml"]),
        );

        let spec = convert(&ParsedCli::with_root(root), &ConvertOptions::default());
        let cmd = spec.command("app").unwrap();
        let schema = |name: &str| cmd.parameter(name, ParameterIn::Flag).unwrap().schema.clone().unwrap();

        assert_eq!(schema("count").schema_type, Some(SchemaType::Integer));
        assert_eq!(schema("count").default, Some(serde_json::json!(42)));
        assert_eq!(schema("ratio").schema_type, Some(SchemaType::Number));
        assert_eq!(schema("dry-run").default, Some(Value::Bool(false)));
        assert_eq!(schema("timeout").schema_type, Some(SchemaType::String));
        assert_eq!(schema("timeout").default, Some(serde_json::json!("30s")));
        assert_eq!(schema("tags").schema_type, Some(SchemaType::Array));
        assert_eq!(schema("tags").default, Some(serde_json::json!(["a", "b"])));
        assert!(schema("tags").items.is_some());
        assert_eq!(schema("format").enum_values.len(), 2);
    }

    #[test]
    fn test_info_derivation_and_override() {
        let mut parsed = testapp();
        parsed.metadata.author = Some("Test Author".into());
        parsed.metadata.license = Some("MIT".into());
        parsed.metadata.homepage = Some(String::new());
        parsed.metadata.tags.push(TagInfo {
            name: "users".into(),
            description: None,
        });

        let spec = convert(&parsed, &ConvertOptions::default());
        let contact = spec.info.contact.clone().unwrap();
        assert_eq!(contact.name.as_deref(), Some("Test Author"));
        assert!(contact.url.is_none());
        assert_eq!(spec.info.license.clone().unwrap().name, "MIT");
        assert_eq!(spec.tags.len(), 1);

        let custom = Info::new("Custom", "9.9.9");
        let spec = convert(
            &parsed,
            &ConvertOptions {
                custom_info: Some(custom.clone()),
                ..Default::default()
            },
        );
        assert_eq!(spec.info, custom);
    }

    #[test]
    fn test_tag_strategies() {
        let mut parsed = testapp();
        let mut tagged = CommandInfo::new("audit");
        tagged.tags = vec!["security".into()];
        add(&mut parsed, "testapp", tagged);

        let tags_of = |spec: &OpenCliSpec, key: &str| spec.command(key).unwrap().tags.clone();

        let auto = convert(&parsed, &ConvertOptions::default());
        assert_eq!(tags_of(&auto, "/testapp/user/create"), vec!["user"]);
        assert_eq!(tags_of(&auto, "/testapp/audit"), vec!["security"]);
        assert!(tags_of(&auto, "testapp").is_empty());

        let manual = convert(
            &parsed,
            &ConvertOptions {
                tag_strategy: TagStrategy::Manual,
                ..Default::default()
            },
        );
        assert!(tags_of(&manual, "/testapp/user/create").is_empty());
        assert_eq!(tags_of(&manual, "/testapp/audit"), vec!["security"]);

        let none = convert(
            &parsed,
            &ConvertOptions {
                tag_strategy: TagStrategy::None,
                ..Default::default()
            },
        );
        assert!(none.commands.values().all(|c| c.tags.is_empty()));
    }

    #[test]
    fn test_empty_model_is_invalid_input() {
        let err = DefaultConverter
            .convert(&ParsedCli::default(), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidInput(_)));
    }

    #[test]
    fn test_operation_id_title_cases_segments() {
        assert_eq!(operation_id("app/Remote/set-url"), "remoteSet-UrlCommand");
        assert_eq!(operation_id("app/config/list"), "configListCommand");
    }

    #[test]
    fn test_tag_strategy_parsing() {
        assert_eq!("Manual".parse::<TagStrategy>().unwrap(), TagStrategy::Manual);
        assert_eq!(TagStrategy::None.to_string(), "none");
        assert!("sometimes".parse::<TagStrategy>().is_err());
    }
}
