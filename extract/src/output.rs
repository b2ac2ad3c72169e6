//! Output encoders for OpenCLI documents.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use opencli_core::{Command, OpenCliSpec, Parameter, ParameterIn, Scope};
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    /// Human-readable command reference.
    Markdown,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "md",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(ExtractError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "markdown",
        };
        f.write_str(name)
    }
}

/// Formats a spec in the requested output format.
///
/// JSON is pretty-printed with two-space indentation.
pub fn format_spec(spec: &OpenCliSpec, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(spec)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(spec)?),
        OutputFormat::Markdown => Ok(spec_to_markdown(spec)),
    }
}

/// Writes a spec to `writer` in the requested output format, followed by a
/// trailing newline for JSON.
pub fn write_spec<W: Write>(spec: &OpenCliSpec, format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, spec)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Yaml => serde_yaml::to_writer(&mut writer, spec)?,
        OutputFormat::Markdown => writer.write_all(spec_to_markdown(spec).as_bytes())?,
    }
    writer.flush()?;
    Ok(())
}

fn spec_to_markdown(spec: &OpenCliSpec) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", spec.info.title));
    if let Some(ref desc) = spec.info.description {
        out.push_str(&format!("{desc}\n\n"));
    }
    out.push_str(&format!("**Version:** {}\n\n", spec.info.version));

    if !spec.environment.is_empty() {
        out.push_str("## Environment\n\n");
        out.push_str("| Variable | Description |\n");
        out.push_str("|----------|-------------|\n");
        for var in &spec.environment {
            let desc = var.description.as_deref().unwrap_or("");
            out.push_str(&format!("| `{}` | {desc} |\n", var.name));
        }
        out.push('\n');
    }

    for (key, command) in &spec.commands {
        command_to_markdown(&mut out, key, command);
    }

    out
}

fn command_to_markdown(out: &mut String, key: &str, command: &Command) {
    out.push_str(&format!("## `{key}`\n\n"));
    if command.deprecated {
        out.push_str("**Deprecated.**\n\n");
    }
    if let Some(ref summary) = command.summary {
        out.push_str(&format!("{summary}\n\n"));
    }
    if let Some(ref desc) = command.description {
        out.push_str(&format!("{desc}\n\n"));
    }
    if command.parameters.is_empty() {
        return;
    }

    out.push_str("| Parameter | Required | Scope | Description |\n");
    out.push_str("|-----------|----------|-------|-------------|\n");
    for param in &command.parameters {
        let required = if param.required { "yes" } else { "no" };
        let scope = match param.scope {
            Scope::Local => "local",
            Scope::Inherited => "inherited",
        };
        let desc = param.description.as_deref().unwrap_or("");
        out.push_str(&format!(
            "| `{}` | {required} | {scope} | {desc} |\n",
            parameter_label(param)
        ));
    }
    out.push('\n');
}

fn parameter_label(param: &Parameter) -> String {
    match param.location {
        ParameterIn::Flag => match param.alias.first() {
            Some(short) => format!("-{short}, --{}", param.name),
            None => format!("--{}", param.name),
        },
        ParameterIn::Argument => format!("<{}>", param.name),
    }
}
