use std::collections::HashSet;
use std::path::PathBuf;

use opencli_core::{ConvertOptions, OpenCliSpec, ParameterIn, SchemaType, Scope, TagStrategy};
use opencli_extract::manifest::CommandNode;
use opencli_extract::{ExtractError, Generator, OutputFormat};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("testapp.yaml")
}

fn testapp() -> CommandNode {
    CommandNode::load(&fixture_path()).expect("fixture should load")
}

fn generate(options: &ConvertOptions) -> OpenCliSpec {
    Generator::new()
        .convert(&testapp(), options)
        .expect("fixture should convert")
}

// ---------------------------------------------------------------------------
// Command tree
// ---------------------------------------------------------------------------

#[test]
fn test_fixture_produces_visible_commands() {
    let spec = generate(&ConvertOptions::default());

    let keys: HashSet<&str> = spec.commands.keys().map(String::as_str).collect();
    let expected: HashSet<&str> = [
        "testapp",
        "/testapp/user",
        "/testapp/user/create",
        "/testapp/user/list",
        "/testapp/user/purge",
        "/testapp/session",
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_hidden_subtree_only_with_include_hidden() {
    let options = ConvertOptions {
        include_hidden: true,
        ..ConvertOptions::default()
    };
    let spec = generate(&options);

    assert!(spec.command("/testapp/internal").unwrap().hidden);
    assert!(spec.command("/testapp/internal/dump").is_some());
    let create = spec.command("/testapp/user/create").unwrap();
    assert!(create.parameter("debug-token", ParameterIn::Flag).is_some());
}

#[test]
fn test_exclude_deprecated_keeps_hidden_policy_independent() {
    let options = ConvertOptions {
        include_deprecated: false,
        ..ConvertOptions::default()
    };
    let spec = generate(&options);

    assert!(spec.command("/testapp/user/purge").is_none());
    assert!(spec.command("/testapp/user/list").is_some());
    assert!(spec.command("/testapp/internal").is_none());
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[test]
fn test_create_command_parameters() {
    let spec = generate(&ConvertOptions::default());
    let create = spec.command("/testapp/user/create").unwrap();

    assert_eq!(create.operation_id.as_deref(), Some("userCreateCommand"));

    let email = create.parameter("email", ParameterIn::Flag).unwrap();
    assert!(email.required);
    assert_eq!(email.scope, Scope::Local);
    assert!(create.parameter("debug-token", ParameterIn::Flag).is_none());

    let username = create.parameter("<username>", ParameterIn::Argument).unwrap();
    assert_eq!(username.position, Some(1));
    assert!(username.required);
    let arity = username.arity.unwrap();
    assert!(arity.min >= 1);
    assert_eq!(arity.max, None);
}

#[test]
fn test_persistent_flags_are_reported_on_their_owner() {
    let spec = generate(&ConvertOptions::default());

    let root = spec.command("testapp").unwrap();
    for name in ["verbose", "config"] {
        let param = root.parameter(name, ParameterIn::Flag).unwrap();
        assert_eq!(param.scope, Scope::Inherited, "{name}");
    }
    assert_eq!(
        root.parameter("output", ParameterIn::Flag).unwrap().scope,
        Scope::Local
    );

    let create = spec.command("/testapp/user/create").unwrap();
    assert!(create.parameter("verbose", ParameterIn::Flag).is_none());
}

#[test]
fn test_no_args_validator_has_no_arguments() {
    let spec = generate(&ConvertOptions::default());
    let list = spec.command("/testapp/user/list").unwrap();

    assert!(
        list.parameters
            .iter()
            .all(|p| p.location != ParameterIn::Argument)
    );
    let limit = list.parameter("limit", ParameterIn::Flag).unwrap();
    let schema = limit.schema.as_ref().unwrap();
    assert_eq!(schema.schema_type, Some(SchemaType::Integer));
    assert_eq!(schema.default, Some(serde_json::json!(20)));
}

#[test]
fn test_valid_args_become_positional_enums() {
    let spec = generate(&ConvertOptions::default());
    let session = spec.command("/testapp/session").unwrap();

    let start = session.parameter("start", ParameterIn::Argument).unwrap();
    assert_eq!(start.position, Some(1));
    assert_eq!(
        start.schema.as_ref().unwrap().enum_values,
        vec![serde_json::json!("start")]
    );
    assert_eq!(
        session.parameter("stop", ParameterIn::Argument).unwrap().position,
        Some(2)
    );
}

// ---------------------------------------------------------------------------
// Document-level policy
// ---------------------------------------------------------------------------

#[test]
fn test_info_from_root_metadata() {
    let spec = generate(&ConvertOptions::default());

    assert_eq!(spec.info.title, "testapp");
    assert_eq!(spec.info.version, "1.0.0");
    let contact = spec.info.contact.as_ref().unwrap();
    assert_eq!(contact.name.as_deref(), Some("Test Author"));
    assert_eq!(contact.url.as_deref(), Some("https://example.com/testapp"));
    assert_eq!(spec.info.license.as_ref().unwrap().name, "MIT");
}

#[test]
fn test_components_lift_shared_flags_once() {
    let spec = generate(&ConvertOptions::default());
    let components = spec.components.as_ref().unwrap();

    assert!(components.parameters.contains_key("output"));
    assert!(!components.parameters.contains_key("email"));
    assert!(!components.parameters.contains_key("limit"));
    assert!(components.responses.contains_key("Success"));
    assert!(components.responses.contains_key("Error"));
}

#[test]
fn test_tag_strategies() {
    let auto = generate(&ConvertOptions::default());
    assert_eq!(auto.command("/testapp/user/create").unwrap().tags, vec!["user"]);
    assert_eq!(
        auto.command("/testapp/session").unwrap().tags,
        vec!["sessions", "auth"]
    );

    let manual = generate(&ConvertOptions {
        tag_strategy: TagStrategy::Manual,
        ..ConvertOptions::default()
    });
    assert!(manual.command("/testapp/user/create").unwrap().tags.is_empty());
    assert_eq!(
        manual.command("/testapp/session").unwrap().tags,
        vec!["sessions", "auth"]
    );

    let none = generate(&ConvertOptions {
        tag_strategy: TagStrategy::None,
        ..ConvertOptions::default()
    });
    assert!(none.commands.values().all(|c| c.tags.is_empty()));
}

#[test]
fn test_extensions_are_prefixed() {
    let spec = generate(&ConvertOptions::default());
    let create = spec.command("/testapp/user/create").unwrap();
    assert!(create.extensions.contains_key("x-manifest-use"));
    assert!(create.extensions.contains_key("x-manifest-args-validator"));
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn test_json_output_parses_back() {
    let json = Generator::new()
        .convert_to_json_string(&testapp(), &ConvertOptions::default())
        .unwrap();
    let decoded: OpenCliSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, generate(&ConvertOptions::default()));
}

#[test]
fn test_yaml_output_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("opencli.{}", OutputFormat::Yaml.extension()));
    let file = std::fs::File::create(&path).unwrap();

    Generator::new()
        .convert_to_yaml(&testapp(), &ConvertOptions::default(), file)
        .unwrap();

    let yaml = std::fs::read_to_string(&path).unwrap();
    assert!(yaml.contains("title: testapp"));
    assert!(yaml.contains("/testapp/user/create:"));
}

#[test]
fn test_missing_manifest_is_io_error() {
    let err = CommandNode::load(&fixture_path().with_file_name("missing.yaml")).unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
}

// ---------------------------------------------------------------------------
// clap
// ---------------------------------------------------------------------------

#[cfg(feature = "clap")]
mod clap_source {
    use clap::{Args, CommandFactory, Parser, Subcommand};

    use super::*;

    /// Manage widgets.
    #[derive(Parser)]
    #[command(name = "widgets", version = "2.0.0")]
    struct Cli {
        /// Increase verbosity.
        #[arg(short, long, global = true)]
        verbose: bool,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Build widgets.
        Build(BuildArgs),
        /// Remove widgets.
        Remove {
            /// Widget names.
            #[arg(required = true)]
            names: Vec<String>,
        },
    }

    #[derive(Args)]
    struct BuildArgs {
        /// Parallel jobs.
        #[arg(short, long, default_value_t = 4)]
        jobs: u16,

        /// Output directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    }

    #[test]
    fn test_derive_command_round_trip() {
        let command = Cli::command();
        let spec = Generator::new()
            .convert(&command, &ConvertOptions::default())
            .unwrap();

        assert_eq!(spec.info.title, "widgets");
        assert_eq!(spec.info.version, "2.0.0");
        assert_eq!(spec.command_count(), 3);

        let build = spec.command("/widgets/build").unwrap();
        assert_eq!(build.operation_id.as_deref(), Some("buildCommand"));
        let jobs = build.parameter("jobs", ParameterIn::Flag).unwrap();
        let schema = jobs.schema.as_ref().unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::Integer));
        assert_eq!(schema.default, Some(serde_json::json!(4)));
        assert!(build.parameter("out-dir", ParameterIn::Flag).is_some());
        assert!(build.parameter("verbose", ParameterIn::Flag).is_none());

        let root = spec.command("widgets").unwrap();
        assert_eq!(
            root.parameter("verbose", ParameterIn::Flag).unwrap().scope,
            Scope::Inherited
        );

        let remove = spec.command("/widgets/remove").unwrap();
        let names = remove.parameter("names", ParameterIn::Argument).unwrap();
        assert!(names.required);
        assert_eq!(
            names.schema.as_ref().unwrap().schema_type,
            Some(SchemaType::Array)
        );
    }
}
