//! The boundary to whatever performs transitive resolution.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use jvmdeps_core::coordinate::{Coordinate, Module};
use jvmdeps_maven::repository::MavenRepository;
use thiserror::Error;

/// A module as the resolver settled it within one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub version: String,
    /// Name of the repository that served this module's metadata.
    pub repository: Option<String>,
    /// Direct dependencies, by module. Their versions live in their own nodes.
    pub dependencies: Vec<Module>,
    /// False for modules pulled in as `<type>pom</type>`: they have no jar to
    /// fetch and only stand in for their own dependencies.
    pub has_jar: bool,
}

/// The result of resolving one root coordinate. The root itself is a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGraph {
    pub root: Coordinate,
    pub nodes: BTreeMap<Module, ResolvedNode>,
}

impl ResolvedGraph {
    pub fn new(root: Coordinate) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root.module(),
            ResolvedNode {
                version: root.version.clone(),
                repository: None,
                dependencies: Vec::new(),
                has_jar: true,
            },
        );
        Self { root, nodes }
    }

    /// Record that `parent` depends on `child`. The first version recorded
    /// for a module is kept.
    pub fn insert(&mut self, parent: &Module, child: Coordinate) {
        let module = child.module();
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.dependencies.contains(&module) {
                node.dependencies.push(module.clone());
            }
        }
        self.nodes.entry(module).or_insert_with(|| ResolvedNode {
            version: child.version,
            repository: None,
            dependencies: Vec::new(),
            has_jar: true,
        });
    }

    pub fn version_of(&self, module: &Module) -> Option<&str> {
        self.nodes.get(module).map(|n| n.version.as_str())
    }

    /// Every node that ships a jar, root included, in module order.
    pub fn artifacts(&self) -> impl Iterator<Item = (Coordinate, &ResolvedNode)> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.has_jar)
            .map(|(module, node)| (module.at(node.version.clone()), node))
    }

    /// Coordinates of the direct jar dependencies of `module` in this graph.
    /// A jarless dependency is replaced by its own jar dependencies.
    pub fn dependencies_of(&self, module: &Module) -> Vec<Coordinate> {
        let mut found = Vec::new();
        let mut seen = BTreeSet::from([module.clone()]);
        self.collect_jar_dependencies(module, &mut seen, &mut found);
        found
    }

    fn collect_jar_dependencies(
        &self,
        module: &Module,
        seen: &mut BTreeSet<Module>,
        found: &mut Vec<Coordinate>,
    ) {
        let Some(node) = self.nodes.get(module) else {
            return;
        };
        for dep in &node.dependencies {
            let Some(dep_node) = self.nodes.get(dep) else {
                continue;
            };
            if dep_node.has_jar {
                let coordinate = dep.at(dep_node.version.clone());
                if !found.contains(&coordinate) {
                    found.push(coordinate);
                }
            } else if seen.insert(dep.clone()) {
                self.collect_jar_dependencies(dep, seen, found);
            }
        }
    }
}

/// Why a resolver could not produce a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResolutionError {
    pub message: String,
}

impl ResolutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Resolve one coordinate into its transitive graph.
///
/// `forced` pins modules to concrete versions wherever they appear in the
/// walk. Implementations must be safe to call concurrently.
#[async_trait]
pub trait GraphResolver: Send + Sync {
    async fn resolve(
        &self,
        coordinate: &Coordinate,
        forced: &BTreeMap<Module, String>,
        repositories: &[MavenRepository],
    ) -> Result<ResolvedGraph, ResolutionError>;
}
