//! Concurrent resolution of every declared coordinate.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use jvmdeps_core::coordinate::{Coordinate, Module};
use jvmdeps_core::declared::DeclaredSet;
use jvmdeps_core::error::{ErrorSet, PipelineError, Stage};
use jvmdeps_maven::repository::MavenRepository;
use jvmdeps_util::errors::collect_all;
use jvmdeps_util::progress::{NoProgress, Phase, ProgressObserver};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::adapter::{GraphResolver, ResolvedGraph};
use crate::overrides::validate_overrides;
use crate::shutdown::Shutdown;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// One coordinate to resolve together with its validated pins.
#[derive(Debug, Clone)]
struct Request {
    coordinate: Coordinate,
    forced: BTreeMap<Module, String>,
}

/// Drives a [`GraphResolver`] over a whole declared set.
pub struct ResolutionOrchestrator {
    resolver: Arc<dyn GraphResolver>,
    repositories: Arc<[MavenRepository]>,
    concurrency: usize,
    progress: Arc<dyn ProgressObserver>,
    shutdown: Shutdown,
}

impl ResolutionOrchestrator {
    pub fn new(resolver: Arc<dyn GraphResolver>, repositories: Vec<MavenRepository>) -> Self {
        Self {
            resolver,
            repositories: repositories.into(),
            concurrency: DEFAULT_CONCURRENCY,
            progress: Arc::new(NoProgress),
            shutdown: Shutdown::new(),
        }
    }

    /// Upper bound on resolutions in flight. Clamped to at least one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Resolve every coordinate of every declared dependency.
    ///
    /// Overrides are validated per dependency first; a dependency whose
    /// overrides fail is not resolved at all, its siblings still are. The
    /// result is either every graph, in declaration order, or every failure.
    pub async fn resolve_all(&self, declared: &DeclaredSet) -> Result<Vec<ResolvedGraph>, ErrorSet> {
        let (requests, mut errors) = plan(declared);

        let total = requests.len();
        tracing::debug!(
            "resolving {total} coordinate(s) with concurrency {}",
            self.concurrency
        );
        self.progress.update(Phase::Resolve, 0, total);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        for (idx, request) in requests.iter().cloned().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            let repositories = Arc::clone(&self.repositories);
            let sem = semaphore.clone();
            let shutdown = self.shutdown.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                let Request { coordinate, forced } = request;
                if shutdown.is_triggered() {
                    return (
                        idx,
                        Err(PipelineError::Interrupted {
                            task: format!("resolution of {coordinate}"),
                        }),
                    );
                }
                tracing::debug!("resolving {coordinate} ({} forced)", forced.len());
                let result = resolver
                    .resolve(&coordinate, &forced, &repositories)
                    .await
                    .map_err(|e| PipelineError::ResolutionFailed {
                        coordinate: coordinate.to_string(),
                        message: e.message,
                    });
                (idx, result)
            });
        }

        // Merge sequentially so nothing is shared between tasks.
        let mut slots: Vec<Option<Result<ResolvedGraph, PipelineError>>> =
            (0..total).map(|_| None).collect();
        let mut completed = 0;
        while let Some(joined) = join_set.join_next().await {
            completed += 1;
            self.progress.update(Phase::Resolve, completed, total);
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => tracing::error!("resolution task failed: {e}"),
            }
        }

        let results = slots.into_iter().zip(&requests).map(|(slot, request)| {
            slot.unwrap_or_else(|| {
                Err(PipelineError::ResolutionFailed {
                    coordinate: request.coordinate.to_string(),
                    message: "resolution task did not complete".to_string(),
                })
            })
        });

        match collect_all(results) {
            Ok(graphs) if errors.is_empty() => {
                tracing::info!("resolved {} graph(s)", graphs.len());
                Ok(graphs)
            }
            Ok(_) => Err(ErrorSet::new(Stage::Resolution, errors)),
            Err(failures) => {
                errors.extend(failures);
                Err(ErrorSet::new(Stage::Resolution, errors))
            }
        }
    }
}

/// Validate overrides and expand dependencies into unique requests.
fn plan(declared: &DeclaredSet) -> (Vec<Request>, Vec<PipelineError>) {
    let mut requests = Vec::new();
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for dependency in declared.dependencies() {
        let forced = match validate_overrides(dependency, declared) {
            Ok(forced) => forced,
            Err(failures) => {
                errors.extend(failures);
                continue;
            }
        };
        for coordinate in dependency.coordinates() {
            if !seen.insert(coordinate.clone()) {
                tracing::debug!("{coordinate} already scheduled");
                continue;
            }
            requests.push(Request {
                coordinate,
                forced: forced.clone(),
            });
        }
    }

    (requests, errors)
}
