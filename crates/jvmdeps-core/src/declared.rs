//! Declared dependencies, version aliasing and forced-version overrides.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use crate::coordinate::{Coordinate, Module};

/// Where a declaration lives in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourcePosition {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    /// Translate a byte offset in `source` into a 1-based line and column.
    pub fn from_offset(file: impl Into<PathBuf>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// The versions a user declared for one module, keyed by alias.
///
/// A plain `version = "x"` declaration is stored as the alias `x -> x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredVersions {
    aliases: BTreeMap<String, String>,
}

impl DeclaredVersions {
    pub fn single(version: impl Into<String>) -> Self {
        let version = version.into();
        let mut aliases = BTreeMap::new();
        aliases.insert(version.clone(), version);
        Self { aliases }
    }

    pub fn insert(&mut self, alias: impl Into<String>, version: impl Into<String>) {
        self.aliases.insert(alias.into(), version.into());
    }

    /// Map a requested version or alias onto a concrete declared version.
    pub fn resolve(&self, requested: &str) -> Option<&str> {
        if let Some(version) = self.aliases.get(requested) {
            return Some(version.as_str());
        }
        self.aliases
            .values()
            .find(|v| v.as_str() == requested)
            .map(String::as_str)
    }

    /// Every concrete version the user accepts for this module.
    pub fn allowed(&self) -> BTreeSet<&str> {
        self.aliases.values().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// One `[dependencies."group:artifact"]` entry.
///
/// Immutable after the configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// `group:artifact`, never carrying a classifier.
    pub module: Module,
    pub versions: DeclaredVersions,
    /// Classifier variants; `None` is the plain artifact.
    pub classifiers: Vec<Option<String>>,
    /// Target module -> requested version or alias of the target.
    pub force_versions: BTreeMap<Module, String>,
    pub position: Option<SourcePosition>,
}

impl DeclaredDependency {
    pub fn new(module: Module, versions: DeclaredVersions) -> Self {
        Self {
            module: module.base(),
            versions,
            classifiers: vec![None],
            force_versions: BTreeMap::new(),
            position: None,
        }
    }

    /// Every module identity this declaration covers, one per classifier.
    pub fn modules(&self) -> Vec<Module> {
        self.classifiers
            .iter()
            .map(|c| self.module.clone().with_classifier(c.clone()))
            .collect()
    }

    /// Expand into concrete coordinates: every declared version times every
    /// classifier variant, without duplicates.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for version in self.versions.allowed() {
            for module in self.modules() {
                let coord = module.at(version);
                if seen.insert(coord.clone()) {
                    out.push(coord);
                }
            }
        }
        out
    }
}

/// The ordered declared-dependency set plus its module lookup.
#[derive(Debug, Clone, Default)]
pub struct DeclaredSet {
    dependencies: Vec<DeclaredDependency>,
    by_module: BTreeMap<Module, usize>,
}

impl DeclaredSet {
    pub fn new(dependencies: Vec<DeclaredDependency>) -> Self {
        let mut by_module = BTreeMap::new();
        for (idx, dep) in dependencies.iter().enumerate() {
            by_module.entry(dep.module.base()).or_insert(idx);
            for module in dep.modules() {
                by_module.entry(module).or_insert(idx);
            }
        }
        Self {
            dependencies,
            by_module,
        }
    }

    /// Look up the declaration covering `module`.
    ///
    /// Falls back to the classifier-less module so a declaration of
    /// `group:artifact` also answers for its classifier variants.
    pub fn get(&self, module: &Module) -> Option<&DeclaredDependency> {
        self.by_module
            .get(module)
            .or_else(|| self.by_module.get(&module.base()))
            .map(|&idx| &self.dependencies[idx])
    }

    pub fn dependencies(&self) -> &[DeclaredDependency] {
        &self.dependencies
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_from_offset_counts_lines_and_columns() {
        let source = "[a]\nkey = 1\n  other = 2\n";
        let offset = source.find("other").unwrap();
        let pos = SourcePosition::from_offset("jvmdeps.toml", source, offset);
        assert_eq!((pos.line, pos.column), (3, 3));
        assert_eq!(pos.to_string(), "jvmdeps.toml:3:3");
    }

    #[test]
    fn position_from_offset_first_line() {
        let pos = SourcePosition::from_offset("f", "abc", 0);
        assert_eq!((pos.line, pos.column), (1, 1));
    }
}
