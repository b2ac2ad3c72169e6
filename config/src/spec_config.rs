//! The `configspec.yaml` document.
//!
//! Describes what a generated OpenCLI document should say about the CLI
//! beyond what the command tree itself carries, where it is written, and
//! the conversion policy.
//!
//! # Example YAML
//!
//! ```yaml
//! info:
//!   title: testapp
//!   description: A test application
//!   version: 1.0.0
//!   contact:
//!     name: Test Author
//!     url: https://example.com
//!   license:
//!     name: MIT
//! source:
//!   type: manifest
//!   path: testapp.yaml
//! output:
//!   directory: dist
//!   formats: [json, yaml]
//!   filename: opencli
//! options:
//!   includeHidden: false
//!   tagStrategy: auto
//! platforms:
//!   - name: linux
//!     architectures: [amd64, arm64]
//! environment:
//!   - name: TESTAPP_CONFIG
//!     description: Path to the config file
//! tags:
//!   - name: user
//!     description: User management
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use opencli_core::{
    CliMetadata, Contact, ConvertOptions, EnvVarInfo, Extensions, Info, License, OPENCLI_VERSION,
    PlatformInfo, TagInfo, TagStrategy,
};
use opencli_extract::OutputFormat;
use opencli_extract::manifest::MANIFEST_EXTRACTOR;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Document info overriding what the command tree provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub title: String,
    pub description: String,
    pub version: String,
    pub contact: ContactConfig,
    pub license: LicenseConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub name: String,
    pub url: String,
}

/// Where the command tree comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    /// Extractor that reads the tree file. Only `manifest` trees can be
    /// loaded from disk.
    #[serde(rename = "type")]
    pub source_type: String,
    /// Path of the command tree file.
    pub path: String,
    /// Local override of `path`, preferred when set.
    pub local_path: String,
    /// Framework the tree was exported from, recorded as
    /// `source-framework` in the framework data.
    pub framework: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source_type: MANIFEST_EXTRACTOR.to_string(),
            path: String::new(),
            local_path: String::new(),
            framework: String::new(),
        }
    }
}

impl SourceConfig {
    /// Resolves the command tree path against `base`, if one is configured.
    pub fn resolve(&self, base: &Path) -> Option<PathBuf> {
        [&self.local_path, &self.path]
            .into_iter()
            .find(|p| !p.trim().is_empty())
            .map(|p| base.join(p))
    }
}

/// Output location and encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory relative to the config file.
    pub directory: String,
    /// Format names: `json`, `yaml` or `markdown`.
    pub formats: Vec<String>,
    /// File name without extension.
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            formats: vec!["json".to_string()],
            filename: "opencli".to_string(),
        }
    }
}

/// Conversion policy, mirroring [`ConvertOptions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsConfig {
    pub include_hidden: bool,
    pub include_deprecated: bool,
    pub generate_operation_ids: bool,
    pub infer_responses: bool,
    pub tag_strategy: TagStrategy,
    pub extract_components: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        let defaults = ConvertOptions::default();
        Self {
            include_hidden: defaults.include_hidden,
            include_deprecated: defaults.include_deprecated,
            generate_operation_ids: defaults.generate_operation_ids,
            infer_responses: defaults.infer_responses,
            tag_strategy: defaults.tag_strategy,
            extract_components: defaults.extract_components,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub name: String,
    pub architectures: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    pub name: String,
    pub description: String,
}

/// Top-level `configspec.yaml` document.
///
/// Every section is optional; missing sections take their defaults.
///
/// # Examples
///
/// ```
/// use opencli_config::SpecConfig;
///
/// let config = SpecConfig::from_yaml_str("info:\n  title: testapp\n").unwrap();
/// config.validate().unwrap();
/// assert_eq!(config.output.filename, "opencli");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecConfig {
    pub info: InfoConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub options: OptionsConfig,
    pub platforms: Vec<PlatformConfig>,
    pub environment: Vec<EnvironmentConfig>,
    pub tags: Vec<TagConfig>,
}

impl SpecConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](ConfigError::Io) if the file cannot be read, or
    /// [`Yaml`](ConfigError::Yaml) if parsing fails. The result is not
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_yaml::from_reader(reader)?;
        debug!(path = %path.display(), title = %config.info.title, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Checks required fields, the source type and output formats.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("info.title", &self.info.title),
            ("output.directory", &self.output.directory),
            ("output.filename", &self.output.filename),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("{field} is required")));
        }
        if self.source.source_type != MANIFEST_EXTRACTOR {
            return Err(ConfigError::Invalid(format!(
                "source.type '{}' cannot be loaded from a file, expected '{MANIFEST_EXTRACTOR}'",
                self.source.source_type
            )));
        }
        if self.output.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "output.formats must contain at least one format".to_string(),
            ));
        }
        self.formats().map(|_| ())
    }

    /// Parsed output formats, duplicates removed, in declaration order.
    pub fn formats(&self) -> Result<Vec<OutputFormat>> {
        let mut formats = Vec::new();
        for name in &self.output.formats {
            let format: OutputFormat = name
                .parse()
                .map_err(|_| ConfigError::UnsupportedFormat(name.clone()))?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }

    /// One output file per format under `base/<directory>`.
    pub fn output_paths(&self, base: &Path) -> Result<Vec<(OutputFormat, PathBuf)>> {
        let dir = self.output_dir(base);
        Ok(self
            .formats()?
            .into_iter()
            .map(|format| {
                let file = format!("{}.{}", self.output.filename, format.extension());
                (format, dir.join(file))
            })
            .collect())
    }

    pub fn output_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.output.directory)
    }

    /// Conversion options with the configured info as the document info.
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            spec_version: OPENCLI_VERSION.to_string(),
            include_hidden: self.options.include_hidden,
            include_deprecated: self.options.include_deprecated,
            generate_operation_ids: self.options.generate_operation_ids,
            infer_responses: self.options.infer_responses,
            tag_strategy: self.options.tag_strategy,
            extract_components: self.options.extract_components,
            custom_info: Some(self.info()),
        }
    }

    /// Appends configured platforms, environment variables and tags.
    pub fn apply_metadata(&self, metadata: &mut CliMetadata) {
        metadata
            .platforms
            .extend(self.platforms.iter().map(|p| PlatformInfo {
                os: p.name.clone(),
                architectures: p.architectures.clone(),
            }));
        metadata
            .env_vars
            .extend(self.environment.iter().map(|e| EnvVarInfo {
                name: e.name.clone(),
                description: non_empty(&e.description),
                required: e.required,
                default: e.default.clone(),
            }));
        metadata.tags.extend(self.tags.iter().map(|t| TagInfo {
            name: t.name.clone(),
            description: non_empty(&t.description),
        }));
    }

    /// Records the configured source framework, if any.
    pub fn apply_framework_data(&self, framework_data: &mut Extensions) {
        let framework = self.source.framework.trim();
        if !framework.is_empty() {
            framework_data.insert("source-framework".to_string(), framework.into());
        }
    }

    fn info(&self) -> Info {
        let contact = &self.info.contact;
        let license = &self.info.license;
        Info {
            title: self.info.title.clone(),
            description: non_empty(&self.info.description),
            version: self.info.version.clone(),
            contact: (!contact.name.is_empty() || !contact.url.is_empty()).then(|| Contact {
                name: non_empty(&contact.name),
                url: non_empty(&contact.url),
                email: None,
            }),
            license: (!license.name.is_empty()).then(|| License {
                name: license.name.clone(),
                url: non_empty(&license.url),
            }),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
info:
  title: testapp
  description: A test application
  version: 1.0.0
  contact:
    name: Test Author
    url: https://example.com
  license:
    name: MIT
source:
  type: manifest
  path: cli/testapp.yaml
  localPath: local/testapp.yaml
output:
  directory: dist
  formats: [json, yml, json]
  filename: testapp
options:
  includeHidden: true
  includeDeprecated: false
  tagStrategy: manual
platforms:
  - name: linux
    architectures: [amd64, arm64]
environment:
  - name: TESTAPP_CONFIG
    description: Path to the config file
tags:
  - name: user
    description: User management
"#;

    #[test]
    fn test_parse_full_document() {
        let config = SpecConfig::from_yaml_str(FULL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.info.title, "testapp");
        assert_eq!(config.source.source_type, "manifest");
        assert!(config.options.include_hidden);
        assert!(!config.options.include_deprecated);
        assert!(config.options.generate_operation_ids);
        assert_eq!(config.options.tag_strategy, TagStrategy::Manual);
        assert_eq!(config.platforms[0].architectures, vec!["amd64", "arm64"]);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config = SpecConfig::from_yaml_str("info:\n  title: x\n").unwrap();
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.options, OptionsConfig::default());
        assert_eq!(config.source.source_type, "manifest");
    }

    #[test]
    fn test_validate_required_fields() {
        let mut config = SpecConfig::default();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid config: info.title is required");

        config.info.title = "testapp".into();
        config.output.directory = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(m)) if m.contains("directory")));

        config.output.directory = "dist".into();
        config.output.formats.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(m)) if m.contains("formats")));

        config.output.formats = vec!["json".into()];
        config.output.filename = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(m)) if m.contains("filename")));
    }

    #[test]
    fn test_validate_rejects_unloadable_source_type() {
        let mut config = SpecConfig::from_yaml_str("info:\n  title: x\nsource:\n  type: clap\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid(m) if m.contains("source.type 'clap'")));

        config.source.source_type = MANIFEST_EXTRACTOR.into();
        config.validate().unwrap();
    }

    #[test]
    fn test_framework_recorded_when_set() {
        let mut data = Extensions::new();
        let mut config = SpecConfig::from_yaml_str("info:\n  title: x\n").unwrap();
        config.apply_framework_data(&mut data);
        assert!(data.is_empty());

        config.source.framework = "cobra".into();
        config.apply_framework_data(&mut data);
        assert_eq!(data.get("source-framework"), Some(&opencli_core::ExtensionValue::from("cobra")));
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let mut config = SpecConfig::from_yaml_str("info:\n  title: x\n").unwrap();
        config.output.formats = vec!["json".into(), "toml".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedFormat(f)) if f == "toml"
        ));
    }

    #[test]
    fn test_output_paths_dedupe_formats() {
        let config = SpecConfig::from_yaml_str(FULL).unwrap();
        let paths = config.output_paths(Path::new("/work")).unwrap();

        assert_eq!(
            paths,
            vec![
                (OutputFormat::Json, PathBuf::from("/work/dist/testapp.json")),
                (OutputFormat::Yaml, PathBuf::from("/work/dist/testapp.yaml")),
            ]
        );
    }

    #[test]
    fn test_source_prefers_local_path() {
        let config = SpecConfig::from_yaml_str(FULL).unwrap();
        assert_eq!(
            config.source.resolve(Path::new("/work")),
            Some(PathBuf::from("/work/local/testapp.yaml"))
        );
        assert_eq!(SourceConfig::default().resolve(Path::new("/work")), None);
    }

    #[test]
    fn test_convert_options_carry_info_and_policy() {
        let config = SpecConfig::from_yaml_str(FULL).unwrap();
        let options = config.convert_options();

        assert!(options.include_hidden);
        assert!(!options.include_deprecated);
        assert_eq!(options.tag_strategy, TagStrategy::Manual);
        let info = options.custom_info.unwrap();
        assert_eq!(info.title, "testapp");
        assert_eq!(info.contact.unwrap().name.as_deref(), Some("Test Author"));
        assert_eq!(info.license.unwrap().name, "MIT");
    }

    #[test]
    fn test_info_omits_empty_contact_and_license() {
        let config = SpecConfig::from_yaml_str("info:\n  title: bare\n").unwrap();
        let info = config.convert_options().custom_info.unwrap();
        assert!(info.contact.is_none());
        assert!(info.license.is_none());
        assert!(info.description.is_none());
    }

    #[test]
    fn test_apply_metadata_appends() {
        let config = SpecConfig::from_yaml_str(FULL).unwrap();
        let mut metadata = CliMetadata {
            tags: vec![TagInfo {
                name: "existing".into(),
                description: None,
            }],
            ..CliMetadata::default()
        };
        config.apply_metadata(&mut metadata);

        assert_eq!(metadata.platforms.len(), 1);
        assert_eq!(metadata.platforms[0].os, "linux");
        assert_eq!(metadata.env_vars[0].name, "TESTAPP_CONFIG");
        let tags: Vec<&str> = metadata.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, vec!["existing", "user"]);
    }
}
