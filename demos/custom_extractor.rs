//! Custom extractor example.
//!
//! Registers an extractor for a home-grown command description (a list of
//! slash-separated command paths) and generates a specification from it.
//! Nothing in the registry changes to support the new source type.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p opencli-demos --example custom_extractor
//! ```

use std::any::Any;

use opencli_core::{CommandInfo, ConvertOptions, ParsedCli, Result, SpecError};
use opencli_extract::{Extractor, Generator};

/// Command paths such as `tool/remote/add`. The first segment is the root.
struct PathList(Vec<&'static str>);

struct PathListExtractor;

impl Extractor for PathListExtractor {
    fn name(&self) -> &str {
        "path-list"
    }

    fn supports(&self, source: &dyn Any) -> bool {
        source.is::<PathList>()
    }

    fn parse(&self, source: &dyn Any) -> Result<ParsedCli> {
        let paths = source
            .downcast_ref::<PathList>()
            .ok_or_else(|| SpecError::InvalidSource {
                extractor: "path-list".to_string(),
                expected: "PathList",
            })?;

        let mut parsed = ParsedCli::default();
        for path in &paths.0 {
            let mut segments = path.split('/');
            let Some(root) = segments.next() else {
                continue;
            };
            if parsed.is_empty() {
                parsed = ParsedCli::with_root(CommandInfo::new(root));
                parsed.metadata.name = root.to_string();
            }

            let mut current = root.to_string();
            for segment in segments {
                let next = format!("{current}/{segment}");
                if !parsed.contains(&next) {
                    let parent = parsed
                        .id_of(&current)
                        .ok_or_else(|| SpecError::InvalidInput(format!("unknown parent {current}")))?;
                    parsed.add_command(parent, CommandInfo::new(segment))?;
                }
                current = next;
            }
        }
        Ok(parsed)
    }
}

fn main() {
    let mut generator = Generator::new();
    generator.register_extractor(PathListExtractor);
    println!("extractors: {}", generator.list_extractors().join(", "));

    let source = PathList(vec![
        "tool/remote/add",
        "tool/remote/remove",
        "tool/status",
    ]);

    match generator.convert_to_yaml_string(&source, &ConvertOptions::default()) {
        Ok(yaml) => print!("{yaml}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
