//! The `clap` extractor.
//!
//! Walks a [`clap::Command`] as declared, without building it, so the
//! result reflects what the application defined rather than what clap adds
//! at parse time. Built-in `help` and `version` arguments, and the `help`
//! subcommand a built command grows, are skipped.
//!
//! clap has no per-command annotation bag, so deprecation, tags and CLI
//! metadata clap does not model (license, homepage, repository) can be
//! attached from the outside with [`AnnotatedCommand`].

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use opencli_core::{
    ArgumentInfo, CliMetadata, CommandId, CommandInfo, FlagInfo, MaxArgs, ParsedCli, Result,
    SpecError, join_path, split_list,
};
use tracing::{debug, info};

use crate::registry::Extractor;

/// Registry name of [`ClapExtractor`].
pub const CLAP_EXTRACTOR: &str = "clap";

/// Major clap version this extractor reads.
const CLAP_VERSION: &str = "4";

/// A [`clap::Command`] plus annotations keyed by command path.
///
/// Recognized keys: `deprecated` and `tags` on any command; `author`,
/// `license`, `homepage` and `repository` on the root. Every key is also
/// copied into the command's annotations.
///
/// # Examples
///
/// ```
/// use clap::Command;
/// use opencli_extract::Extractor;
/// use opencli_extract::clap_command::{AnnotatedCommand, ClapExtractor};
///
/// let source = AnnotatedCommand::new(
///     Command::new("tool").subcommand(Command::new("legacy")),
/// )
/// .annotate("tool", "license", "MIT")
/// .annotate("tool/legacy", "deprecated", "use `modern` instead");
///
/// let parsed = ClapExtractor.parse(&source).unwrap();
/// assert_eq!(parsed.metadata.license.as_deref(), Some("MIT"));
/// assert!(parsed.get("tool/legacy").unwrap().is_deprecated());
/// ```
#[derive(Debug, Clone)]
pub struct AnnotatedCommand {
    command: Command,
    annotations: BTreeMap<String, BTreeMap<String, String>>,
}

impl AnnotatedCommand {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            annotations: BTreeMap::new(),
        }
    }

    /// Attaches `key = value` to the command at `path`.
    pub fn annotate(
        mut self,
        path: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.annotations
            .entry(path.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

/// Extractor for [`clap::Command`] and [`AnnotatedCommand`] sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClapExtractor;

impl Extractor for ClapExtractor {
    fn name(&self) -> &str {
        CLAP_EXTRACTOR
    }

    fn supports(&self, source: &dyn Any) -> bool {
        source.is::<Command>() || source.is::<AnnotatedCommand>()
    }

    fn parse(&self, source: &dyn Any) -> Result<ParsedCli> {
        let empty = BTreeMap::new();
        let (command, annotations) = if let Some(command) = source.downcast_ref::<Command>() {
            (command, &empty)
        } else if let Some(annotated) = source.downcast_ref::<AnnotatedCommand>() {
            (&annotated.command, &annotated.annotations)
        } else {
            return Err(SpecError::InvalidSource {
                extractor: CLAP_EXTRACTOR.to_string(),
                expected: "clap::Command or AnnotatedCommand",
            });
        };

        let walker = Walker { annotations };
        let root_path = command.get_name().to_string();
        let root = walker.command_info(command, &root_path, &HashSet::new());
        let mut parsed = ParsedCli::with_root(root);
        if let Some(root_id) = parsed.root_id() {
            walker.walk(&mut parsed, root_id, command, &root_path, &global_ids(command))?;
        }

        parsed.metadata = walker.metadata(command, &root_path);
        parsed
            .framework_data
            .insert("framework".into(), CLAP_EXTRACTOR.into());
        parsed
            .framework_data
            .insert("version".into(), CLAP_VERSION.into());

        info!(
            cli = %parsed.metadata.name,
            commands = parsed.len(),
            "Extracted clap command tree"
        );
        Ok(parsed)
    }
}

struct Walker<'a> {
    annotations: &'a BTreeMap<String, BTreeMap<String, String>>,
}

impl Walker<'_> {
    fn walk(
        &self,
        parsed: &mut ParsedCli,
        parent: CommandId,
        command: &Command,
        path: &str,
        inherited: &HashSet<String>,
    ) -> Result<()> {
        for sub in command.get_subcommands() {
            if sub.get_name() == "help" {
                continue;
            }
            let sub_path = join_path(path, sub.get_name());
            let info = self.command_info(sub, &sub_path, inherited);
            let id = parsed.add_command(parent, info)?;

            let mut globals = inherited.clone();
            globals.extend(global_ids(sub));
            self.walk(parsed, id, sub, &sub_path, &globals)?;
        }
        Ok(())
    }

    fn command_info(&self, command: &Command, path: &str, inherited: &HashSet<String>) -> CommandInfo {
        let mut info = CommandInfo::new(command.get_name());
        info.usage = usage_line(command);
        info.short = command.get_about().map(ToString::to_string);
        info.long = command.get_long_about().map(ToString::to_string);
        info.example = command
            .get_after_long_help()
            .or_else(|| command.get_after_help())
            .map(ToString::to_string);
        info.aliases = command.get_all_aliases().map(String::from).collect();
        info.version = command
            .get_version()
            .or_else(|| command.get_long_version())
            .map(String::from);
        info.hidden = command.is_hide_set();
        info.runnable = !command.has_subcommands() || !command.is_subcommand_required_set();

        if let Some(author) = command.get_author() {
            info.annotations.insert("author".into(), author.to_string());
        }
        if let Some(annotations) = self.annotations.get(path) {
            info.annotations
                .extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        info.deprecated = info.annotations.get("deprecated").cloned();
        if let Some(tags) = info.annotations.get("tags") {
            info.tags = split_list(tags);
        }
        if command.is_subcommand_required_set() {
            info.extensions
                .insert("clap-subcommand-required".into(), true.into());
        }

        for arg in command.get_arguments() {
            if arg.is_positional() || is_builtin(arg) {
                continue;
            }
            let global = arg.is_global_set();
            if global && inherited.contains(arg.get_id().as_str()) {
                continue;
            }
            info.add_flag(flag_info(arg, global));
        }

        info.args = positionals(command)
            .into_iter()
            .enumerate()
            .map(|(index, arg)| argument_info(arg, index + 1))
            .collect();

        debug!(
            command = %path,
            flags = info.flags.len(),
            persistent_flags = info.persistent_flags.len(),
            args = info.args.len(),
            "Extracted command"
        );
        info
    }

    fn metadata(&self, root: &Command, root_path: &str) -> CliMetadata {
        let annotation = |key: &str| {
            self.annotations
                .get(root_path)
                .and_then(|annotations| annotations.get(key))
                .cloned()
        };
        CliMetadata {
            name: root.get_name().to_string(),
            version: root.get_version().map(String::from),
            description: root
                .get_long_about()
                .or_else(|| root.get_about())
                .map(ToString::to_string),
            author: annotation("author").or_else(|| root.get_author().map(String::from)),
            license: annotation("license"),
            homepage: annotation("homepage"),
            repository: annotation("repository"),
            ..CliMetadata::default()
        }
    }
}

fn is_builtin(arg: &Arg) -> bool {
    matches!(
        arg.get_action(),
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    ) || matches!(arg.get_id().as_str(), "help" | "version")
}

fn global_ids(command: &Command) -> HashSet<String> {
    command
        .get_arguments()
        .filter(|arg| arg.is_global_set())
        .map(|arg| arg.get_id().to_string())
        .collect()
}

/// Positionals in index order. Arguments without an explicit index keep
/// their declaration order after the indexed ones.
fn positionals(command: &Command) -> Vec<&Arg> {
    let mut args: Vec<&Arg> = command.get_positionals().collect();
    args.sort_by_key(|arg| arg.get_index().unwrap_or(usize::MAX));
    args
}

fn flag_info(arg: &Arg, persistent: bool) -> FlagInfo {
    let id = arg.get_id().as_str();
    let mut flag = FlagInfo::new(arg.get_long().unwrap_or(id), type_tag(arg));
    flag.shorthand = arg.get_short();
    flag.usage = help(arg).unwrap_or_default();
    flag.default_value = default_value(arg);
    flag.required = arg.is_required_set();
    flag.hidden = arg.is_hide_set();
    flag.persistent = persistent;
    flag.valid_values = possible_values(arg);

    if let Some(name) = arg.get_value_names().and_then(|names| names.first()) {
        flag.annotations
            .insert("value_name".into(), name.as_str().to_string());
    }
    if let Some(heading) = arg.get_help_heading() {
        flag.annotations
            .insert("help_heading".into(), heading.to_string());
    }
    flag
}

fn argument_info(arg: &Arg, position: usize) -> ArgumentInfo {
    let mut info = ArgumentInfo::new(arg.get_id().as_str(), position);
    info.description = help(arg);
    info.required = arg.is_required_set();
    info.type_tag = type_tag(arg).to_string();
    info.valid_values = possible_values(arg);

    let (min, max) = match arg.get_num_args() {
        Some(range) => (range.min_values(), range.max_values()),
        None if matches!(arg.get_action(), ArgAction::Append) => (1, usize::MAX),
        None => (1, 1),
    };
    info.min_args = if info.required { min.max(1) } else { 0 };
    info.max_args = if max == usize::MAX {
        MaxArgs::Unbounded
    } else {
        MaxArgs::Bounded(max)
    };
    info
}

fn help(arg: &Arg) -> Option<String> {
    arg.get_help()
        .or_else(|| arg.get_long_help())
        .map(ToString::to_string)
}

fn default_value(arg: &Arg) -> Option<String> {
    arg.get_default_values()
        .first()
        .and_then(|value| value.to_str())
        .map(String::from)
}

fn possible_values(arg: &Arg) -> Vec<String> {
    if !arg.get_action().takes_values() {
        return Vec::new();
    }
    arg.get_possible_values()
        .iter()
        .filter(|value| !value.is_hide_set())
        .map(|value| value.get_name().to_string())
        .collect()
}

/// Maps an argument to a type tag from its action, then its value parser.
fn type_tag(arg: &Arg) -> &'static str {
    match arg.get_action() {
        ArgAction::SetTrue | ArgAction::SetFalse => return "bool",
        ArgAction::Count => return "uint8",
        ArgAction::Append => return "stringSlice",
        _ => {}
    }
    if arg
        .get_num_args()
        .is_some_and(|range| range.max_values() > 1)
    {
        return "stringSlice";
    }

    let value_type = arg.get_value_parser().type_id();
    let known = [
        (TypeId::of::<bool>(), "bool"),
        (TypeId::of::<i8>(), "int8"),
        (TypeId::of::<i16>(), "int16"),
        (TypeId::of::<i32>(), "int32"),
        (TypeId::of::<i64>(), "int64"),
        (TypeId::of::<isize>(), "int"),
        (TypeId::of::<u8>(), "uint8"),
        (TypeId::of::<u16>(), "uint16"),
        (TypeId::of::<u32>(), "uint32"),
        (TypeId::of::<u64>(), "uint64"),
        (TypeId::of::<usize>(), "uint"),
        (TypeId::of::<f32>(), "float32"),
        (TypeId::of::<f64>(), "float64"),
        (TypeId::of::<PathBuf>(), "string"),
    ];
    known
        .iter()
        .find(|(id, _)| value_type == *id)
        .map_or("string", |(_, tag)| *tag)
}

/// Renders a usage line the way clap's help does, from declared arguments.
fn usage_line(command: &Command) -> String {
    let mut parts = vec![command.get_name().to_string()];
    if command
        .get_arguments()
        .any(|arg| !arg.is_positional() && !is_builtin(arg))
    {
        parts.push("[OPTIONS]".to_string());
    }
    for arg in positionals(command) {
        let name = arg
            .get_value_names()
            .and_then(|names| names.first())
            .map_or_else(|| arg.get_id().as_str().to_uppercase(), |n| n.to_string());
        let repeated = matches!(arg.get_action(), ArgAction::Append)
            || arg.get_num_args().is_some_and(|r| r.max_values() > 1);
        let dots = if repeated { "..." } else { "" };
        parts.push(if arg.is_required_set() {
            format!("<{name}>{dots}")
        } else {
            format!("[{name}]{dots}")
        });
    }
    if command.has_subcommands() {
        parts.push(if command.is_subcommand_required_set() {
            "<COMMAND>".to_string()
        } else {
            "[COMMAND]".to_string()
        });
    }
    parts.join(" ")
}
