//! Artifact pipeline: dedupe, fetch concurrently, hash, collect every failure.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use jvmdeps_core::coordinate::Coordinate;
use jvmdeps_core::error::{ErrorSet, PipelineError, Stage};
use jvmdeps_resolver::adapter::ResolvedGraph;
use jvmdeps_resolver::shutdown::Shutdown;
use jvmdeps_util::hash::sha256_file;
use jvmdeps_util::progress::{NoProgress, Phase, ProgressObserver};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// What to fetch: a coordinate and the repository that resolved it, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    pub coordinate: Coordinate,
    pub repository: Option<String>,
}

impl ArtifactLocator {
    /// Identity string, `group:artifact:version[:classifier]`.
    pub fn id(&self) -> String {
        self.coordinate.to_string()
    }
}

/// A fetched artifact on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    /// Where the bytes came from, when the fetcher knows.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Puts an artifact's bytes on local disk. Owns caching and retries.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, locator: &ArtifactLocator) -> Result<FetchedArtifact, FetchError>;
}

/// One unique artifact, fetched and hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutput {
    pub coordinate: Coordinate,
    pub repository: Option<String>,
    pub url: Option<String>,
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file at `path`.
    pub sha256: String,
}

impl ArtifactOutput {
    pub fn id(&self) -> String {
        self.coordinate.to_string()
    }
}

/// Everything a pipeline run produced, successes and failures alike.
#[derive(Debug, Default)]
pub struct ArtifactReport {
    /// Sorted by identity string.
    pub outputs: Vec<ArtifactOutput>,
    pub errors: Vec<PipelineError>,
}

impl ArtifactReport {
    pub fn into_result(self) -> Result<Vec<ArtifactOutput>, ErrorSet> {
        if self.errors.is_empty() {
            Ok(self.outputs)
        } else {
            Err(ErrorSet::new(Stage::Fetch, self.errors))
        }
    }
}

/// Every artifact referenced by any graph, once, sorted by identity string.
/// Jarless (`pom`-typed) nodes are left out.
///
/// When graphs disagree on the repository, the first one recorded wins.
pub fn unique_artifacts(graphs: &[ResolvedGraph]) -> Vec<ArtifactLocator> {
    let mut unique: BTreeMap<String, ArtifactLocator> = BTreeMap::new();
    for graph in graphs {
        for (coordinate, node) in graph.artifacts() {
            let entry = unique
                .entry(coordinate.to_string())
                .or_insert_with(|| ArtifactLocator {
                    coordinate,
                    repository: None,
                });
            if entry.repository.is_none() {
                entry.repository = node.repository.clone();
            }
        }
    }
    unique.into_values().collect()
}

/// Fetches and hashes the artifacts of a set of graphs.
pub struct ArtifactPipeline {
    fetcher: Arc<dyn ContentFetcher>,
    concurrency: usize,
    progress: Arc<dyn ProgressObserver>,
    shutdown: Shutdown,
}

impl ArtifactPipeline {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            progress: Arc::new(NoProgress),
            shutdown: Shutdown::new(),
        }
    }

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

    /// Fetch every unique artifact exactly once.
    ///
    /// A failed fetch never stops the others; the report carries every
    /// output that succeeded and every error that did not.
    pub async fn run(&self, graphs: &[ResolvedGraph]) -> ArtifactReport {
        let locators = unique_artifacts(graphs);
        let total = locators.len();
        tracing::debug!("fetching {total} artifact(s) with concurrency {}", self.concurrency);
        self.progress.update(Phase::Fetch, 0, total);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        for (idx, locator) in locators.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let sem = semaphore.clone();
            let shutdown = self.shutdown.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                if shutdown.is_triggered() {
                    return (
                        idx,
                        Err(PipelineError::Interrupted {
                            task: format!("fetch of {}", locator.id()),
                        }),
                    );
                }
                (idx, fetch_and_hash(fetcher.as_ref(), locator).await)
            });
        }

        // Merge sequentially so nothing is shared between tasks.
        let mut slots: Vec<Option<Result<ArtifactOutput, PipelineError>>> =
            (0..total).map(|_| None).collect();
        let mut completed = 0;
        while let Some(joined) = join_set.join_next().await {
            completed += 1;
            self.progress.update(Phase::Fetch, completed, total);
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => tracing::error!("fetch task failed: {e}"),
            }
        }

        let mut outputs = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for (slot, locator) in slots.into_iter().zip(&locators) {
            match slot {
                Some(Ok(output)) => outputs.push(output),
                Some(Err(e)) => errors.push(e),
                None => errors.push(PipelineError::ArtifactFetchFailed {
                    artifact: locator.id(),
                    message: "fetch task did not complete".to_string(),
                }),
            }
        }

        tracing::info!(
            "fetched {} artifact(s), {} failure(s)",
            outputs.len(),
            errors.len()
        );
        ArtifactReport { outputs, errors }
    }
}

async fn fetch_and_hash(
    fetcher: &dyn ContentFetcher,
    locator: ArtifactLocator,
) -> Result<ArtifactOutput, PipelineError> {
    let id = locator.id();
    let fetched = fetcher
        .fetch(&locator)
        .await
        .map_err(|e| PipelineError::ArtifactFetchFailed {
            artifact: id.clone(),
            message: e.message,
        })?;

    let path = fetched.path.clone();
    let hashed = tokio::task::spawn_blocking(move || sha256_file(&path)).await;
    let sha256 = match hashed {
        Ok(Ok(digest)) => digest,
        Ok(Err(e)) => {
            return Err(PipelineError::HashComputationFailed {
                artifact: id,
                path: fetched.path,
                message: e.to_string(),
            })
        }
        Err(e) => {
            return Err(PipelineError::HashComputationFailed {
                artifact: id,
                path: fetched.path,
                message: format!("hashing task failed: {e}"),
            })
        }
    };

    tracing::debug!("{id} sha256={sha256}");
    Ok(ArtifactOutput {
        coordinate: locator.coordinate,
        repository: locator.repository,
        url: fetched.url,
        path: fetched.path,
        sha256,
    })
}
