//! Version conflict detection over the resolution index.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use jvmdeps_core::coordinate::{Coordinate, Module};
use jvmdeps_core::declared::SourcePosition;
use jvmdeps_core::error::{ErrorSet, PipelineError, Stage};

use crate::index::ResolutionIndex;

/// A module that resolved to several versions, some of which nobody declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDiagnostic {
    pub module: Module,
    pub unexpected: BTreeSet<String>,
    /// Versions the user declared for this module; empty when undeclared.
    pub declared: BTreeSet<String>,
    /// Unexpected version -> roots that introduced it.
    pub roots: BTreeMap<String, BTreeSet<Coordinate>>,
    pub position: Option<SourcePosition>,
}

impl ConflictDiagnostic {
    /// Every root responsible for an unexpected version.
    pub fn all_roots(&self) -> BTreeSet<&Coordinate> {
        self.roots.values().flatten().collect()
    }

    pub fn to_error(&self) -> PipelineError {
        PipelineError::ConflictingTransitiveVersion {
            module: self.module.to_string(),
            unexpected: self.unexpected.iter().cloned().collect(),
            declared: self.declared.iter().cloned().collect(),
            roots: self.all_roots().into_iter().map(ToString::to_string).collect(),
            position: self.position.clone(),
        }
    }
}

impl fmt::Display for ConflictDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.module)?;
        for (version, roots) in &self.roots {
            let roots: Vec<String> = roots.iter().map(ToString::to_string).collect();
            write!(f, " {version} (via {})", roots.join(", "))?;
        }
        Ok(())
    }
}

/// All conflicts found in one pass, sorted by module.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub diagnostics: Vec<ConflictDiagnostic>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drop diagnostics for modules the user chose to ignore. A classifier-less
    /// entry covers every classifier of that module.
    pub fn without(mut self, ignored: &[Module]) -> Self {
        self.diagnostics.retain(|d| {
            let skip = ignored
                .iter()
                .any(|m| m == &d.module || (m.classifier.is_none() && m == &d.module.base()));
            if skip {
                tracing::info!("ignoring version conflict on {}", d.module);
            }
            !skip
        });
        self
    }

    /// Pass if nothing was found, otherwise fail with every diagnostic.
    pub fn into_result(self) -> Result<(), ErrorSet> {
        if self.diagnostics.is_empty() {
            return Ok(());
        }
        let errors = self.diagnostics.iter().map(ConflictDiagnostic::to_error).collect();
        Err(ErrorSet::new(Stage::Conflicts, errors))
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.diagnostics.len())?;
        for d in &self.diagnostics {
            writeln!(f, "  {d}")?;
        }
        Ok(())
    }
}

/// Inspect every module with more than one resolved version.
///
/// Declared modules only conflict on versions outside their declared set.
/// Undeclared modules conflict on all of their versions. The whole index is
/// always walked.
pub fn diagnose(index: &ResolutionIndex<'_>) -> ConflictReport {
    let mut diagnostics = Vec::new();

    for (module, versions) in index.modules() {
        if versions.len() < 2 {
            continue;
        }

        let declared_dep = index.declared(module);
        let declared: BTreeSet<String> = declared_dep
            .map(|d| d.versions.allowed().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        let unexpected: BTreeSet<String> = versions.difference(&declared).cloned().collect();
        if unexpected.is_empty() {
            continue;
        }

        let roots = unexpected
            .iter()
            .map(|v| {
                let roots = index.roots(module, v).cloned().unwrap_or_default();
                (v.clone(), roots)
            })
            .collect();

        diagnostics.push(ConflictDiagnostic {
            module: module.clone(),
            unexpected,
            declared,
            roots,
            position: declared_dep.and_then(|d| d.position.clone()),
        });
    }

    tracing::debug!("{} module(s) with conflicting versions", diagnostics.len());
    ConflictReport { diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ResolvedGraph;
    use jvmdeps_core::declared::{DeclaredDependency, DeclaredSet, DeclaredVersions};

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    fn graph(root: &str, deps: &[&str]) -> ResolvedGraph {
        let root = coord(root);
        let mut g = ResolvedGraph::new(root.clone());
        for dep in deps {
            g.insert(&root.module(), coord(dep));
        }
        g
    }

    fn diagnostic(module: &str) -> ConflictDiagnostic {
        ConflictDiagnostic {
            module: Module::parse(module).unwrap(),
            unexpected: BTreeSet::from(["2".to_string()]),
            declared: BTreeSet::new(),
            roots: BTreeMap::new(),
            position: None,
        }
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::default();
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "No version conflicts.");
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn single_version_is_never_a_conflict() {
        let graphs = vec![
            graph("a:app:1.0", &["c:common:1.1"]),
            graph("o:other:2.0", &["c:common:1.1"]),
        ];
        let declared = DeclaredSet::default();
        let index = ResolutionIndex::build(&graphs, &declared);
        assert!(diagnose(&index).is_empty());
    }

    #[test]
    fn declared_superset_is_not_a_conflict() {
        let mut versions = DeclaredVersions::single("1.1");
        versions.insert("new", "1.2");
        let declared = DeclaredSet::new(vec![DeclaredDependency::new(
            Module::new("c", "common"),
            versions,
        )]);
        let graphs = vec![
            graph("a:app:1.0", &["c:common:1.1"]),
            graph("o:other:2.0", &["c:common:1.2"]),
        ];
        let index = ResolutionIndex::build(&graphs, &declared);
        assert!(diagnose(&index).is_empty());
    }

    #[test]
    fn declared_module_reports_only_unexpected_versions() {
        let mut dep = DeclaredDependency::new(
            Module::new("c", "common"),
            DeclaredVersions::single("1.1"),
        );
        dep.position = Some(SourcePosition {
            file: "jvmdeps.toml".into(),
            line: 7,
            column: 1,
        });
        let declared = DeclaredSet::new(vec![dep]);
        let graphs = vec![
            graph("a:app:1.0", &["c:common:1.1"]),
            graph("o:other:2.0", &["c:common:1.2"]),
        ];
        let index = ResolutionIndex::build(&graphs, &declared);
        let report = diagnose(&index);

        assert_eq!(report.len(), 1);
        let d = &report.diagnostics[0];
        assert_eq!(d.unexpected, BTreeSet::from(["1.2".to_string()]));
        assert_eq!(d.declared, BTreeSet::from(["1.1".to_string()]));
        assert_eq!(d.all_roots(), BTreeSet::from([&coord("o:other:2.0")]));
        assert!(d.to_error().to_string().starts_with("jvmdeps.toml:7:1:"));
    }

    #[test]
    fn diagnostics_sorted_by_module() {
        let graphs = vec![
            graph("a:app:1.0", &["z:last:1", "b:first:1"]),
            graph("o:other:2.0", &["z:last:2", "b:first:2"]),
        ];
        let declared = DeclaredSet::default();
        let index = ResolutionIndex::build(&graphs, &declared);
        let modules: Vec<String> = diagnose(&index)
            .diagnostics
            .iter()
            .map(|d| d.module.to_string())
            .collect();
        assert_eq!(modules, vec!["b:first", "z:last"]);
    }

    #[test]
    fn ignore_policy_applies_after_collection() {
        let report = ConflictReport {
            diagnostics: vec![
                diagnostic("org.slf4j:slf4j-api"),
                diagnostic("io.netty:netty-epoll:linux-x86_64"),
                diagnostic("com.example:kept"),
            ],
        };
        let ignored = vec![
            Module::new("org.slf4j", "slf4j-api"),
            Module::new("io.netty", "netty-epoll"),
        ];
        let report = report.without(&ignored);
        assert_eq!(report.len(), 1);
        assert_eq!(report.diagnostics[0].module.to_string(), "com.example:kept");

        let err = report.into_result().unwrap_err();
        assert_eq!(err.stage, Stage::Conflicts);
        assert_eq!(err.len(), 1);
    }
}
