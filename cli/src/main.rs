use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use opencli_config::SpecConfig;
use opencli_core::{ConvertOptions, OpenCliSpec, TagStrategy};
use opencli_extract::clap_command::AnnotatedCommand;
use opencli_extract::manifest::{CommandNode, MANIFEST_EXTRACTOR};
use opencli_extract::output::format_spec;
use opencli_extract::{Generator, OutputFormat};
use tracing::{debug, info};

const PACKAGE_NAME: &str = "opencli-gen";
const PACKAGE_LICENSE: &str = env!("CARGO_PKG_LICENSE");

#[derive(Debug, Parser)]
#[command(name = PACKAGE_NAME, version)]
#[command(about = "Generate OpenCLI specifications from command trees")]
#[command(
    long_about = "Generate OpenCLI specifications from command trees.\n\nReads a declarative command tree (YAML or JSON) and writes a framework-neutral OpenCLI document describing its commands, flags and arguments."
)]
struct Cli {
    /// Log debug details to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a specification from a command tree file.
    Generate(GenerateArgs),
    /// Print the specification of this tool.
    SelfSpec(SelfSpecArgs),
    /// List registered extractors.
    ListExtractors,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Command tree file (.yaml, .yml or .json). Defaults to the config's source.
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Path to configspec.yaml.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Output file. Defaults to stdout, or the config's output section.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Output format. Defaults to the output file's extension, then json.
    /// With --config, only this format is written instead of every
    /// configured one.
    #[arg(long, short, value_enum)]
    format: Option<OutputFormat>,
    /// Include hidden commands and flags.
    #[arg(long)]
    include_hidden: bool,
    /// Omit deprecated commands.
    #[arg(long)]
    exclude_deprecated: bool,
    /// Do not synthesize operation ids.
    #[arg(long)]
    no_operation_ids: bool,
    /// Do not add default exit-code responses.
    #[arg(long)]
    no_responses: bool,
    /// Do not extract shared components.
    #[arg(long)]
    no_components: bool,
    /// How commands are tagged: auto, manual or none.
    #[arg(long)]
    tag_strategy: Option<TagStrategy>,
}

#[derive(Debug, Args)]
struct SelfSpecArgs {
    /// Output format.
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::SelfSpec(args) => run_self_spec(args),
        Command::ListExtractors => run_list_extractors(),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber. `RUST_LOG` takes precedence over the flags.
fn configure_logging(verbose: bool, quiet: bool) {
    use tracing::Level;
    use tracing_subscriber::EnvFilter;

    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let config = args.config.as_deref().map(load_config).transpose()?;
    let config_dir = args
        .config
        .as_deref()
        .map(config_base_dir)
        .unwrap_or_default();

    let input = args
        .input
        .clone()
        .or_else(|| {
            config
                .as_ref()
                .and_then(|c| c.source.resolve(&config_dir))
        })
        .ok_or_else(|| "Specify a command tree with --input or source.path in the config".to_string())?;

    let tree = CommandNode::load(&input)
        .map_err(|err| format!("Failed to load command tree '{}': {err}", input.display()))?;
    debug!(input = %input.display(), "Loaded command tree");

    let generator = Generator::new();
    let extractor = config
        .as_ref()
        .map_or(MANIFEST_EXTRACTOR, |c| c.source.source_type.as_str());
    let mut parsed = generator
        .parse_with(extractor, &tree)
        .map_err(|e| e.to_string())?;
    let mut options = match &config {
        Some(config) => {
            config.apply_metadata(&mut parsed.metadata);
            config.apply_framework_data(&mut parsed.framework_data);
            config.convert_options()
        }
        None => ConvertOptions::default(),
    };
    apply_overrides(&args, &mut options);

    let spec = generator
        .convert_parsed(&parsed, &options)
        .map_err(|e| e.to_string())?;

    match (&args.output, &config) {
        (Some(path), _) => {
            let format = args
                .format
                .or_else(|| OutputFormat::from_path(path))
                .unwrap_or(OutputFormat::Json);
            write_spec_file(&spec, format, path)?;
            println!("Wrote {} command(s) to '{}'.", spec.command_count(), path.display());
        }
        (None, Some(config)) => {
            let paths = match args.format {
                Some(format) => {
                    let file = format!("{}.{}", config.output.filename, format.extension());
                    vec![(format, config.output_dir(&config_dir).join(file))]
                }
                None => config.output_paths(&config_dir).map_err(|e| e.to_string())?,
            };
            for (format, path) in &paths {
                write_spec_file(&spec, *format, path)?;
                println!("Wrote '{}'.", path.display());
            }
            info!(files = paths.len(), "Generation complete");
        }
        (None, None) => {
            let raw = format_spec(&spec, args.format.unwrap_or(OutputFormat::Json))
                .map_err(|e| e.to_string())?;
            print_raw(&raw);
        }
    }

    Ok(())
}

fn run_self_spec(args: SelfSpecArgs) -> Result<(), String> {
    let source = AnnotatedCommand::new(Cli::command()).annotate(PACKAGE_NAME, "license", PACKAGE_LICENSE);
    let raw = Generator::new()
        .convert_to_string(&source, &ConvertOptions::default(), args.format)
        .map_err(|e| e.to_string())?;
    print_raw(&raw);
    Ok(())
}

fn run_list_extractors() -> Result<(), String> {
    for name in Generator::new().list_extractors() {
        println!("{name}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<SpecConfig, String> {
    let config = SpecConfig::load(path)
        .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Directory relative paths in a config file resolve against.
fn config_base_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Applies command-line switches on top of the configured options.
fn apply_overrides(args: &GenerateArgs, options: &mut ConvertOptions) {
    if args.include_hidden {
        options.include_hidden = true;
    }
    if args.exclude_deprecated {
        options.include_deprecated = false;
    }
    if args.no_operation_ids {
        options.generate_operation_ids = false;
    }
    if args.no_responses {
        options.infer_responses = false;
    }
    if args.no_components {
        options.extract_components = false;
    }
    if let Some(strategy) = args.tag_strategy {
        options.tag_strategy = strategy;
    }
}

fn write_spec_file(spec: &OpenCliSpec, format: OutputFormat, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    let raw = format_spec(spec, format).map_err(|e| e.to_string())?;
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn print_raw(raw: &str) {
    if raw.ends_with('\n') {
        print!("{raw}");
    } else {
        println!("{raw}");
    }
}
