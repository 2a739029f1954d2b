use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jvmdeps_core::coordinate::{Coordinate, Module};
use jvmdeps_core::declared::{DeclaredDependency, DeclaredSet, DeclaredVersions};
use jvmdeps_core::error::{PipelineError, Stage};
use jvmdeps_maven::repository::MavenRepository;
use jvmdeps_resolver::adapter::{GraphResolver, ResolutionError, ResolvedGraph};
use jvmdeps_resolver::conflict::diagnose;
use jvmdeps_resolver::index::ResolutionIndex;
use jvmdeps_resolver::orchestrator::ResolutionOrchestrator;
use jvmdeps_resolver::shutdown::Shutdown;
use jvmdeps_util::progress::{Phase, ProgressObserver};

fn coord(s: &str) -> Coordinate {
    Coordinate::parse(s).unwrap()
}

fn module(s: &str) -> Module {
    Module::parse(s).unwrap()
}

fn declare(m: &str, version: &str) -> DeclaredDependency {
    DeclaredDependency::new(module(m), DeclaredVersions::single(version))
}

/// Serves canned graphs and records every call.
#[derive(Default)]
struct FakeResolver {
    graphs: BTreeMap<Coordinate, ResolvedGraph>,
    failures: BTreeMap<Coordinate, String>,
    calls: Mutex<Vec<(Coordinate, BTreeMap<Module, String>)>>,
}

impl FakeResolver {
    fn with_graph(mut self, root: &str, deps: &[&str]) -> Self {
        let root = coord(root);
        let mut graph = ResolvedGraph::new(root.clone());
        for dep in deps {
            graph.insert(&root.module(), coord(dep));
        }
        self.graphs.insert(root, graph);
        self
    }

    fn failing(mut self, root: &str, message: &str) -> Self {
        self.failures.insert(coord(root), message.to_string());
        self
    }

    fn calls(&self) -> Vec<(Coordinate, BTreeMap<Module, String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphResolver for FakeResolver {
    async fn resolve(
        &self,
        coordinate: &Coordinate,
        forced: &BTreeMap<Module, String>,
        _repositories: &[MavenRepository],
    ) -> Result<ResolvedGraph, ResolutionError> {
        self.calls
            .lock()
            .unwrap()
            .push((coordinate.clone(), forced.clone()));
        if let Some(message) = self.failures.get(coordinate) {
            return Err(ResolutionError::new(message.clone()));
        }
        Ok(self
            .graphs
            .get(coordinate)
            .cloned()
            .unwrap_or_else(|| ResolvedGraph::new(coordinate.clone())))
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<(Phase, usize, usize)>>);

impl ProgressObserver for Recorder {
    fn update(&self, phase: Phase, completed: usize, total: usize) {
        self.0.lock().unwrap().push((phase, completed, total));
    }
}

fn orchestrator(resolver: Arc<FakeResolver>) -> ResolutionOrchestrator {
    ResolutionOrchestrator::new(resolver, vec![MavenRepository::maven_central()])
        .with_concurrency(2)
}

#[tokio::test]
async fn graphs_come_back_in_declaration_order() {
    let resolver = Arc::new(FakeResolver::default());
    let declared = DeclaredSet::new(vec![
        declare("z:last", "1"),
        declare("a:first", "1"),
        declare("m:middle", "1"),
    ]);

    let graphs = orchestrator(resolver.clone())
        .resolve_all(&declared)
        .await
        .unwrap();
    let roots: Vec<String> = graphs.iter().map(|g| g.root.to_string()).collect();
    assert_eq!(roots, vec!["z:last:1", "a:first:1", "m:middle:1"]);
    assert_eq!(resolver.calls().len(), 3);
}

#[tokio::test]
async fn overrides_are_passed_as_concrete_versions() {
    let resolver = Arc::new(FakeResolver::default());
    let mut app = declare("org.example:app", "1.0");
    app.force_versions
        .insert(module("com.google.guava:guava"), "stable".into());
    let mut guava_versions = DeclaredVersions::default();
    guava_versions.insert("stable", "31.1-jre");
    let guava = DeclaredDependency::new(module("com.google.guava:guava"), guava_versions);

    orchestrator(resolver.clone())
        .resolve_all(&DeclaredSet::new(vec![app, guava]))
        .await
        .unwrap();

    let calls = resolver.calls();
    let (_, forced) = calls
        .iter()
        .find(|(c, _)| c.to_string() == "org.example:app:1.0")
        .unwrap();
    assert_eq!(
        forced.get(&module("com.google.guava:guava")).map(String::as_str),
        Some("31.1-jre")
    );
}

#[tokio::test]
async fn unknown_module_override_skips_only_that_dependency() {
    let resolver = Arc::new(FakeResolver::default());
    let mut bad = declare("org.example:bad", "1.0");
    bad.force_versions.insert(module("org.x:x"), "1.0".into());
    let declared = DeclaredSet::new(vec![bad, declare("org.example:good", "1.0")]);

    let err = orchestrator(resolver.clone())
        .resolve_all(&declared)
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Resolution);
    assert_eq!(err.len(), 1);
    assert!(matches!(
        &err.errors[0],
        PipelineError::UnknownModuleOverride { module, .. } if module == "org.x:x"
    ));
    let called: Vec<String> = resolver.calls().iter().map(|(c, _)| c.to_string()).collect();
    assert_eq!(called, vec!["org.example:good:1.0"]);
}

#[tokio::test]
async fn same_unknown_override_in_two_dependencies_reports_both() {
    let resolver = Arc::new(FakeResolver::default());
    let mut a = declare("org.example:a", "1.0");
    a.force_versions.insert(module("org.x:x"), "1.0".into());
    let mut b = declare("org.example:b", "1.0");
    b.force_versions.insert(module("org.x:x"), "1.0".into());

    let err = orchestrator(resolver.clone())
        .resolve_all(&DeclaredSet::new(vec![a, b]))
        .await
        .unwrap_err();

    assert_eq!(err.len(), 2);
    let owners: Vec<&str> = err
        .iter()
        .filter_map(|e| match e {
            PipelineError::UnknownModuleOverride { dependency, module, .. }
                if module == "org.x:x" =>
            {
                Some(dependency.as_str())
            }
            _ => None,
        })
        .collect();
    assert_eq!(owners, vec!["org.example:a", "org.example:b"]);
    assert!(resolver.calls().is_empty());
}

#[tokio::test]
async fn all_failures_are_reported_together() {
    let resolver = Arc::new(FakeResolver::default().failing("org.example:broken:1.0", "HTTP 500"));
    let mut bad = declare("org.example:bad", "1.0");
    bad.force_versions.insert(module("org.x:x"), "1.0".into());
    bad.force_versions
        .insert(module("org.example:good"), "9.9".into());
    let declared = DeclaredSet::new(vec![
        bad,
        declare("org.example:good", "1.0"),
        declare("org.example:broken", "1.0"),
    ]);

    let err = orchestrator(resolver)
        .resolve_all(&declared)
        .await
        .unwrap_err();

    assert_eq!(err.len(), 3);
    assert!(err
        .iter()
        .any(|e| matches!(e, PipelineError::UnknownModuleOverride { .. })));
    assert!(err
        .iter()
        .any(|e| matches!(e, PipelineError::UnknownVersionOverride { .. })));
    assert!(err.iter().any(|e| matches!(
        e,
        PipelineError::ResolutionFailed { coordinate, message }
            if coordinate == "org.example:broken:1.0" && message == "HTTP 500"
    )));
}

#[tokio::test]
async fn duplicate_coordinates_resolve_once() {
    let resolver = Arc::new(FakeResolver::default());
    let mut versions = DeclaredVersions::single("1.0");
    versions.insert("also", "1.0");
    let dep = DeclaredDependency::new(module("org.example:lib"), versions);

    let graphs = orchestrator(resolver.clone())
        .resolve_all(&DeclaredSet::new(vec![dep]))
        .await
        .unwrap();
    assert_eq!(graphs.len(), 1);
    assert_eq!(resolver.calls().len(), 1);
}

#[tokio::test]
async fn progress_counts_every_completion() {
    let resolver = Arc::new(FakeResolver::default());
    let recorder = Arc::new(Recorder::default());
    let declared = DeclaredSet::new(vec![declare("a:a", "1"), declare("b:b", "1")]);

    orchestrator(resolver)
        .with_progress(recorder.clone())
        .resolve_all(&declared)
        .await
        .unwrap();

    let updates = recorder.0.lock().unwrap().clone();
    assert_eq!(updates.first(), Some(&(Phase::Resolve, 0, 2)));
    assert_eq!(updates.last(), Some(&(Phase::Resolve, 2, 2)));
}

#[tokio::test]
async fn shutdown_stops_new_resolutions() {
    let resolver = Arc::new(FakeResolver::default());
    let shutdown = Shutdown::new();
    shutdown.trigger();
    let declared = DeclaredSet::new(vec![declare("a:a", "1"), declare("b:b", "1")]);

    let err = orchestrator(resolver.clone())
        .with_shutdown(shutdown)
        .resolve_all(&declared)
        .await
        .unwrap_err();

    assert_eq!(err.len(), 2);
    assert!(err
        .iter()
        .all(|e| matches!(e, PipelineError::Interrupted { .. })));
    assert!(resolver.calls().is_empty());
}

#[tokio::test]
async fn undeclared_transitive_conflict_is_attributed_to_roots() {
    let resolver = Arc::new(
        FakeResolver::default()
            .with_graph("org.example:app:1.0", &["org.example:common:1.1"])
            .with_graph("org.example:other:2.0", &["org.example:common:1.2"]),
    );
    let declared = DeclaredSet::new(vec![
        declare("org.example:app", "1.0"),
        declare("org.example:other", "2.0"),
    ]);

    let graphs = orchestrator(resolver)
        .resolve_all(&declared)
        .await
        .unwrap();
    let index = ResolutionIndex::build(&graphs, &declared);
    let report = diagnose(&index);

    assert_eq!(report.len(), 1);
    let d = &report.diagnostics[0];
    assert_eq!(d.module, module("org.example:common"));
    assert_eq!(
        d.unexpected.iter().cloned().collect::<Vec<_>>(),
        vec!["1.1", "1.2"]
    );
    assert!(d.declared.is_empty());
    assert!(d.position.is_none());
    let roots: Vec<String> = d.all_roots().iter().map(|c| c.to_string()).collect();
    assert_eq!(roots, vec!["org.example:app:1.0", "org.example:other:2.0"]);

    let err = report.into_result().unwrap_err();
    assert!(err.errors[0].to_string().starts_with("<no position>:"));
}

#[tokio::test]
async fn resolving_twice_builds_the_same_index() {
    let resolver = Arc::new(
        FakeResolver::default()
            .with_graph("org.example:app:1.0", &["org.example:common:1.1"])
            .with_graph("org.example:other:2.0", &["org.example:common:1.2"]),
    );
    let declared = DeclaredSet::new(vec![
        declare("org.example:app", "1.0"),
        declare("org.example:other", "2.0"),
    ]);
    let orchestrator = orchestrator(resolver);

    let first = orchestrator.resolve_all(&declared).await.unwrap();
    let second = orchestrator.resolve_all(&declared).await.unwrap();
    assert_eq!(first, second);

    let a = ResolutionIndex::build(&first, &declared);
    let b = ResolutionIndex::build(&second, &declared);
    let a_modules: Vec<_> = a.modules().collect();
    let b_modules: Vec<_> = b.modules().collect();
    assert_eq!(a_modules, b_modules);
    assert_eq!(diagnose(&a).diagnostics, diagnose(&b).diagnostics);
}
