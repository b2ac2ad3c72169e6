//! High-level facade over the registry, the converter and the encoders.

use std::any::Any;
use std::io::Write;

use opencli_core::{ConvertOptions, Converter, DefaultConverter, OpenCliSpec, ParsedCli};
use tracing::{debug, info};

use crate::error::{ExtractError, Result};
use crate::manifest::ManifestExtractor;
use crate::output::{OutputFormat, format_spec, write_spec};
use crate::registry::{Extractor, ExtractorRegistry};

/// Generates OpenCLI documents from framework command objects.
///
/// # Examples
///
/// ```
/// use opencli_core::ConvertOptions;
/// use opencli_extract::Generator;
/// use opencli_extract::manifest::CommandNode;
///
/// let tree = CommandNode::new("testapp").with_subcommand(CommandNode::new("status"));
/// let json = Generator::new()
///     .convert_to_json_string(&tree, &ConvertOptions::default())
///     .unwrap();
/// assert!(json.contains("\"/testapp/status\""));
/// ```
pub struct Generator {
    registry: ExtractorRegistry,
    converter: Box<dyn Converter>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Creates a generator with every built-in extractor registered.
    pub fn new() -> Self {
        let mut registry = ExtractorRegistry::new();
        registry.register(ManifestExtractor);
        #[cfg(feature = "clap")]
        registry.register(crate::clap_command::ClapExtractor);
        Self::with_registry(registry)
    }

    /// Creates a generator over a caller-supplied registry.
    pub fn with_registry(registry: ExtractorRegistry) -> Self {
        Self {
            registry,
            converter: Box::new(DefaultConverter),
        }
    }

    /// Replaces the converter used by every subsequent conversion.
    pub fn set_converter(&mut self, converter: impl Converter + 'static) {
        self.converter = Box::new(converter);
    }

    pub fn register_extractor(&mut self, extractor: impl Extractor + 'static) {
        self.registry.register(extractor);
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn list_extractors(&self) -> Vec<&str> {
        self.registry.list()
    }

    pub fn extractor(&self, name: &str) -> Option<&dyn Extractor> {
        self.registry.get(name)
    }

    /// Selects an extractor for `source` and builds the intermediate model.
    pub fn parse(&self, source: &dyn Any) -> Result<ParsedCli> {
        let extractor = self
            .registry
            .find_extractor(source)
            .map_err(ExtractError::Find)?;
        debug!(extractor = %extractor.name(), "Selected extractor");
        extractor.parse(source).map_err(ExtractError::Parse)
    }

    /// Parses `source` with a specific extractor, bypassing selection.
    pub fn parse_with(&self, name: &str, source: &dyn Any) -> Result<ParsedCli> {
        let extractor = self
            .registry
            .get(name)
            .ok_or_else(|| ExtractError::ExtractorNotFound(name.to_string()))?;
        extractor.parse(source).map_err(ExtractError::Parse)
    }

    /// Converts an already extracted model.
    pub fn convert_parsed(&self, parsed: &ParsedCli, options: &ConvertOptions) -> Result<OpenCliSpec> {
        let spec = self
            .converter
            .convert(parsed, options)
            .map_err(ExtractError::Convert)?;
        info!(
            cli = %parsed.metadata.name,
            commands = spec.command_count(),
            parameters = spec.parameter_count(),
            "Generated OpenCLI spec"
        );
        Ok(spec)
    }

    /// Runs the whole pipeline: select, extract, convert.
    pub fn convert(&self, source: &dyn Any, options: &ConvertOptions) -> Result<OpenCliSpec> {
        let parsed = self.parse(source)?;
        self.convert_parsed(&parsed, options)
    }

    /// Runs the pipeline and encodes the result to `writer`.
    pub fn convert_to_writer<W: Write>(
        &self,
        source: &dyn Any,
        options: &ConvertOptions,
        format: OutputFormat,
        writer: W,
    ) -> Result<()> {
        let spec = self.convert(source, options)?;
        write_spec(&spec, format, writer)
    }

    pub fn convert_to_json<W: Write>(
        &self,
        source: &dyn Any,
        options: &ConvertOptions,
        writer: W,
    ) -> Result<()> {
        self.convert_to_writer(source, options, OutputFormat::Json, writer)
    }

    pub fn convert_to_yaml<W: Write>(
        &self,
        source: &dyn Any,
        options: &ConvertOptions,
        writer: W,
    ) -> Result<()> {
        self.convert_to_writer(source, options, OutputFormat::Yaml, writer)
    }

    pub fn convert_to_string(
        &self,
        source: &dyn Any,
        options: &ConvertOptions,
        format: OutputFormat,
    ) -> Result<String> {
        let spec = self.convert(source, options)?;
        format_spec(&spec, format)
    }

    pub fn convert_to_json_string(&self, source: &dyn Any, options: &ConvertOptions) -> Result<String> {
        self.convert_to_string(source, options, OutputFormat::Json)
    }

    pub fn convert_to_yaml_string(&self, source: &dyn Any, options: &ConvertOptions) -> Result<String> {
        self.convert_to_string(source, options, OutputFormat::Yaml)
    }
}
