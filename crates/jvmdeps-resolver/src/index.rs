//! Cross-graph view of everything the resolutions produced.

use std::collections::{BTreeMap, BTreeSet};

use jvmdeps_core::coordinate::{Coordinate, Module};
use jvmdeps_core::declared::{DeclaredDependency, DeclaredSet};

use crate::adapter::ResolvedGraph;

/// Every version each module resolved to, and which roots pulled it in.
///
/// Built once after all resolutions complete; read-only afterwards. Every
/// `(module, version)` in `versions_by_module` has at least one root.
#[derive(Debug)]
pub struct ResolutionIndex<'a> {
    graphs: &'a [ResolvedGraph],
    declared: &'a DeclaredSet,
    versions_by_module: BTreeMap<Module, BTreeSet<String>>,
    roots_by_module_version: BTreeMap<(Module, String), BTreeSet<Coordinate>>,
}

impl<'a> ResolutionIndex<'a> {
    pub fn build(graphs: &'a [ResolvedGraph], declared: &'a DeclaredSet) -> Self {
        let mut versions_by_module: BTreeMap<Module, BTreeSet<String>> = BTreeMap::new();
        let mut roots_by_module_version: BTreeMap<(Module, String), BTreeSet<Coordinate>> =
            BTreeMap::new();

        for graph in graphs {
            for (module, node) in &graph.nodes {
                versions_by_module
                    .entry(module.clone())
                    .or_default()
                    .insert(node.version.clone());
                roots_by_module_version
                    .entry((module.clone(), node.version.clone()))
                    .or_default()
                    .insert(graph.root.clone());
            }
        }

        Self {
            graphs,
            declared,
            versions_by_module,
            roots_by_module_version,
        }
    }

    /// Modules with their resolved versions, in module order.
    pub fn modules(&self) -> impl Iterator<Item = (&Module, &BTreeSet<String>)> {
        self.versions_by_module.iter()
    }

    /// Roots whose graphs resolved `module` to `version`.
    pub fn roots(&self, module: &Module, version: &str) -> Option<&BTreeSet<Coordinate>> {
        self.roots_by_module_version
            .get(&(module.clone(), version.to_string()))
    }

    pub fn declared(&self, module: &Module) -> Option<&'a DeclaredDependency> {
        self.declared.get(module)
    }

    /// Direct dependencies of `coordinate`, merged over every graph in which
    /// its module resolved to exactly this version.
    pub fn dependencies_of(&self, coordinate: &Coordinate) -> BTreeSet<Coordinate> {
        let module = coordinate.module();
        self.graphs
            .iter()
            .filter(|g| g.version_of(&module) == Some(coordinate.version.as_str()))
            .flat_map(|g| g.dependencies_of(&module))
            .collect()
    }
}
