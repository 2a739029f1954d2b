//! A [`GraphResolver`] that walks Maven POMs: breadth-first, nearest wins.
//!
//! Handles parent POM inheritance of properties and dependencyManagement,
//! `${property}` interpolation, scope and optional filtering, exclusions and
//! forced versions. Version ranges, BOM imports and profiles are not
//! supported; such versions are used literally.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use jvmdeps_core::coordinate::{Coordinate, Module};
use jvmdeps_maven::cache::LocalCache;
use jvmdeps_maven::pom::{Pom, PomExclusion};
use jvmdeps_maven::repository::MavenRepository;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::adapter::{GraphResolver, ResolutionError, ResolvedGraph, ResolvedNode};

const MAX_CONCURRENT_FETCHES: usize = 8;
const MAX_PARENT_DEPTH: usize = 10;

/// Entry in the BFS queue.
struct QueueEntry {
    module: Module,
    version: String,
    depth: usize,
    parent: Option<Module>,
    exclusions: Vec<PomExclusion>,
    has_jar: bool,
}

/// Resolves graphs from POMs in the local cache or the configured repositories.
#[derive(Clone)]
pub struct PomGraphResolver {
    client: Client,
    cache: LocalCache,
    semaphore: Arc<Semaphore>,
}

impl PomGraphResolver {
    pub fn new(client: Client, cache: LocalCache) -> Self {
        Self {
            client,
            cache,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES)),
        }
    }
}

#[async_trait]
impl GraphResolver for PomGraphResolver {
    async fn resolve(
        &self,
        coordinate: &Coordinate,
        forced: &BTreeMap<Module, String>,
        repositories: &[MavenRepository],
    ) -> Result<ResolvedGraph, ResolutionError> {
        let repos: Arc<[MavenRepository]> = repositories.to_vec().into();
        let mut nodes: BTreeMap<Module, ResolvedNode> = BTreeMap::new();
        let mut queue: VecDeque<QueueEntry> = VecDeque::new();

        queue.push_back(QueueEntry {
            module: coordinate.module(),
            version: coordinate.version.clone(),
            depth: 0,
            parent: None,
            exclusions: Vec::new(),
            has_jar: true,
        });

        while !queue.is_empty() {
            // Drain the current depth level from the front of the queue
            let current_depth = queue.front().map(|e| e.depth).unwrap_or(0);
            let mut level = Vec::new();
            while let Some(entry) = queue.pop_front() {
                if entry.depth != current_depth {
                    queue.push_front(entry);
                    break;
                }
                level.push(entry);
            }

            let mut winners = Vec::new();
            for mut entry in level {
                if entry.depth > 0 {
                    if let Some(version) = forced_version(forced, &entry.module) {
                        entry.version = version.to_string();
                    }
                }
                if let Some(parent) = entry.parent.as_ref().and_then(|p| nodes.get_mut(p)) {
                    if !parent.dependencies.contains(&entry.module) {
                        parent.dependencies.push(entry.module.clone());
                    }
                }
                if nodes.contains_key(&entry.module) {
                    continue;
                }
                nodes.insert(
                    entry.module.clone(),
                    ResolvedNode {
                        version: entry.version.clone(),
                        repository: None,
                        dependencies: Vec::new(),
                        has_jar: entry.has_jar,
                    },
                );
                winners.push(entry);
            }

            let poms = self.fetch_level(&winners, &repos).await?;

            for entry in winners {
                let Some((pom, repo)) = poms.get(&(entry.module.base(), entry.version.clone()))
                else {
                    continue;
                };
                if let Some(node) = nodes.get_mut(&entry.module) {
                    node.repository = Some(repo.clone());
                }

                for dep in pom.dependencies.iter().filter(|d| d.is_transitive()) {
                    if entry
                        .exclusions
                        .iter()
                        .any(|ex| ex.matches(&dep.group_id, &dep.artifact_id))
                    {
                        continue;
                    }
                    let version = dep
                        .version
                        .clone()
                        .or_else(|| {
                            pom.managed_version(&dep.group_id, &dep.artifact_id)
                                .map(str::to_string)
                        })
                        .unwrap_or_default();
                    if version.is_empty() || version.contains("${") {
                        tracing::warn!(
                            "skipping {}:{} from {}: no usable version",
                            dep.group_id,
                            dep.artifact_id,
                            entry.module
                        );
                        continue;
                    }

                    let mut exclusions = entry.exclusions.clone();
                    exclusions.extend(dep.exclusions.iter().cloned());

                    queue.push_back(QueueEntry {
                        module: Module::new(&dep.group_id, &dep.artifact_id)
                            .with_classifier(dep.classifier.clone()),
                        version,
                        depth: entry.depth + 1,
                        parent: Some(entry.module.clone()),
                        exclusions,
                        has_jar: dep.has_jar(),
                    });
                }
            }
        }

        Ok(ResolvedGraph {
            root: coordinate.clone(),
            nodes,
        })
    }
}

impl PomGraphResolver {
    /// Prefetch effective POMs for one BFS level in parallel. POMs are shared by
    /// every classifier of a module, so they are keyed by base module.
    async fn fetch_level(
        &self,
        level: &[QueueEntry],
        repos: &Arc<[MavenRepository]>,
    ) -> Result<HashMap<(Module, String), (Pom, String)>, ResolutionError> {
        let mut wanted: Vec<(Module, String)> = level
            .iter()
            .map(|e| (e.module.base(), e.version.clone()))
            .collect();
        wanted.sort();
        wanted.dedup();

        let mut join_set = JoinSet::new();
        for (module, version) in wanted {
            let client = self.client.clone();
            let cache = self.cache.clone();
            let repos = Arc::clone(repos);
            let sem = self.semaphore.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                let result = fetch_effective_pom(&client, &cache, &repos, &module, &version).await;
                ((module, version), result)
            });
        }

        let mut poms = HashMap::new();
        while let Some(joined) = join_set.join_next().await {
            let (key, result) =
                joined.map_err(|e| ResolutionError::new(format!("POM fetch task failed: {e}")))?;
            poms.insert(key, result?);
        }
        Ok(poms)
    }
}

/// Forced version for `module`, falling back to its classifier-less form.
fn forced_version<'a>(forced: &'a BTreeMap<Module, String>, module: &Module) -> Option<&'a str> {
    forced
        .get(module)
        .or_else(|| forced.get(&module.base()))
        .map(String::as_str)
}

/// Fetch a POM from the first repository that has it. A repository error only
/// fails the lookup when no later repository serves the POM.
async fn fetch_pom_from_repos(
    client: &Client,
    cache: &LocalCache,
    repos: &[MavenRepository],
    group: &str,
    artifact: &str,
    version: &str,
) -> miette::Result<Option<(Pom, String)>> {
    let mut last_err = None;
    for repo in repos {
        match cache.fetch_pom(client, repo, group, artifact, version).await {
            Ok(Some(pom)) => return Ok(Some((pom, repo.name.clone()))),
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!("{group}:{artifact}:{version} from {}: {e}", repo.name);
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

/// Fetch a POM, merge its parent chain into it and interpolate properties.
async fn fetch_effective_pom(
    client: &Client,
    cache: &LocalCache,
    repos: &[MavenRepository],
    module: &Module,
    version: &str,
) -> Result<(Pom, String), ResolutionError> {
    let found = fetch_pom_from_repos(client, cache, repos, &module.group, &module.artifact, version)
        .await
        .map_err(|e| ResolutionError::new(format!("{module}:{version}: {e}")))?;
    let Some((mut pom, repo)) = found else {
        return Err(ResolutionError::new(format!(
            "{module}:{version} was not found in any repository"
        )));
    };

    let mut next = pom.parent.clone();
    let mut depth = 0;
    while let Some(parent_ref) = next.take() {
        depth += 1;
        if depth > MAX_PARENT_DEPTH {
            tracing::warn!("{module}:{version}: parent chain deeper than {MAX_PARENT_DEPTH}");
            break;
        }
        let parent = fetch_pom_from_repos(
            client,
            cache,
            repos,
            &parent_ref.group_id,
            &parent_ref.artifact_id,
            &parent_ref.version,
        )
        .await
        .map_err(|e| ResolutionError::new(format!("parent of {module}:{version}: {e}")))?;
        match parent {
            Some((parent, _)) => {
                next = parent.parent.clone();
                pom.apply_parent(&parent);
            }
            None => {
                tracing::warn!(
                    "parent {}:{}:{} of {module}:{version} not found",
                    parent_ref.group_id,
                    parent_ref.artifact_id,
                    parent_ref.version
                );
            }
        }
    }

    pom.resolve_properties();
    Ok((pom, repo))
}
