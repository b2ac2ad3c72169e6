//! clap extraction example.
//!
//! Defines a small server-management CLI with clap's derive API and prints
//! its OpenCLI specification.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p opencli-demos --example sample_cli
//! cargo run -p opencli-demos --example sample_cli -- yaml
//! ```

use clap::{Args, CommandFactory, Parser, Subcommand};
use opencli_core::{ConvertOptions, TagStrategy};
use opencli_extract::clap_command::AnnotatedCommand;
use opencli_extract::{Generator, OutputFormat};

/// A sample CLI application.
///
/// Sample CLI is a demonstration application that shows how a clap command
/// tree becomes an OpenCLI document. It includes common patterns like
/// global flags, subcommands and nested commands.
#[derive(Parser)]
#[command(name = "sample-cli", version = "1.0.0")]
struct SampleCli {
    /// Config file (default is $HOME/.sample-cli.yaml).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage server operations.
    #[command(subcommand)]
    Server(ServerCommands),
}

#[derive(Subcommand)]
enum ServerCommands {
    /// Start the server.
    Start(StartArgs),
    /// Stop the server.
    Stop,
}

#[derive(Args)]
struct StartArgs {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host to bind to.
    #[arg(long, default_value = "localhost")]
    host: String,
}

fn main() {
    let format = match std::env::args().nth(1) {
        Some(raw) => raw.parse::<OutputFormat>().unwrap_or_else(|err| {
            eprintln!("{err}");
            std::process::exit(2);
        }),
        None => OutputFormat::Json,
    };

    let source = AnnotatedCommand::new(SampleCli::command())
        .annotate("sample-cli", "license", "MIT")
        .annotate("sample-cli/server", "tags", "server, operations");

    let options = ConvertOptions {
        tag_strategy: TagStrategy::Auto,
        ..ConvertOptions::default()
    };

    let generator = Generator::new();
    if let Err(err) = generator.convert_to_writer(&source, &options, format, std::io::stdout()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
