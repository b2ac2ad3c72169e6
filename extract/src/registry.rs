//! Extractor trait and the name-keyed extractor registry.
//!
//! An extractor knows how to recognize one framework's command object and
//! realize it as a [`ParsedCli`]. The registry picks the extractor for an
//! arbitrary source by asking each one whether it supports it.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use opencli_core::{ParsedCli, Result, SpecError};
use tracing::{debug, warn};

/// Framework-specific command tree extractor.
///
/// Implementations must be stateless with respect to individual calls: the
/// same extractor can serve any number of parses, from any thread.
pub trait Extractor: Send + Sync {
    /// Unique registry name, e.g. `clap`.
    fn name(&self) -> &str;

    /// Returns `true` if this extractor can parse `source`.
    ///
    /// This is a pure probe and must not inspect more than the type.
    fn supports(&self, source: &dyn Any) -> bool;

    /// Walks `source` and builds the intermediate model.
    ///
    /// Fails with [`SpecError::InvalidSource`] when `source` is not a
    /// supported type.
    fn parse(&self, source: &dyn Any) -> Result<ParsedCli>;
}

/// Name-keyed set of extractors.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extractor under its own name.
    ///
    /// Registering a second extractor with the same name replaces the first.
    pub fn register(&mut self, extractor: impl Extractor + 'static) {
        self.register_boxed(Box::new(extractor));
    }

    /// Adds an already boxed extractor under its own name.
    pub fn register_boxed(&mut self, extractor: Box<dyn Extractor>) {
        let name = extractor.name().to_string();
        if self.extractors.insert(name.clone(), extractor).is_some() {
            debug!(extractor = %name, "Replaced registered extractor");
        } else {
            debug!(extractor = %name, "Registered extractor");
        }
    }

    /// Looks up an extractor by name.
    pub fn get(&self, name: &str) -> Option<&dyn Extractor> {
        self.extractors.get(name).map(|extractor| extractor.as_ref())
    }

    /// Finds the extractor that supports `source`.
    ///
    /// At most one extractor is expected to claim a given source type. When
    /// several do, a warning is logged and the one with the lowest name wins
    /// so the choice is stable across runs.
    pub fn find_extractor(&self, source: &dyn Any) -> Result<&dyn Extractor> {
        let mut candidates: Vec<&dyn Extractor> = self
            .extractors
            .values()
            .map(|extractor| extractor.as_ref())
            .filter(|extractor| extractor.supports(source))
            .collect();
        candidates.sort_by(|a, b| a.name().cmp(b.name()));

        if candidates.len() > 1 {
            let names: Vec<&str> = candidates.iter().map(|e| e.name()).collect();
            warn!(candidates = ?names, "Multiple extractors support the source");
        }

        candidates
            .into_iter()
            .next()
            .ok_or(SpecError::NoSuitableExtractor)
    }

    /// Registered extractor names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extractors", &self.list())
            .finish()
    }
}
