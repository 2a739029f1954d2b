//! Content fetcher backed by Maven repositories and the local cache.

use async_trait::async_trait;
use jvmdeps_maven::cache::LocalCache;
use jvmdeps_maven::repository::MavenRepository;
use jvmdeps_maven::{checksum, download};
use reqwest::Client;

use crate::artifacts::{ArtifactLocator, ContentFetcher, FetchError, FetchedArtifact};

/// Downloads JARs into the local cache and hands back the cached path.
#[derive(Clone)]
pub struct MavenFetcher {
    client: Client,
    cache: LocalCache,
    repositories: Vec<MavenRepository>,
}

impl MavenFetcher {
    pub fn new(client: Client, cache: LocalCache, repositories: Vec<MavenRepository>) -> Self {
        Self {
            client,
            cache,
            repositories,
        }
    }

    /// The repository that resolved the artifact first, then the rest in order.
    fn candidates(&self, preferred: Option<&str>) -> Vec<&MavenRepository> {
        let mut repos: Vec<&MavenRepository> = self.repositories.iter().collect();
        if let Some(name) = preferred {
            repos.sort_by_key(|r| r.name != name);
        }
        repos
    }
}

#[async_trait]
impl ContentFetcher for MavenFetcher {
    async fn fetch(&self, locator: &ArtifactLocator) -> Result<FetchedArtifact, FetchError> {
        let coord = &locator.coordinate;
        let candidates = self.candidates(locator.repository.as_deref());

        if let Some(path) = self.cache.get_jar(coord) {
            tracing::debug!("{coord} is cached");
            return Ok(FetchedArtifact {
                path,
                url: candidates.first().map(|r| r.jar_url(coord)),
            });
        }

        let mut last_err = None;
        for repo in &candidates {
            let url = repo.jar_url(coord);
            let data = match download::download_bytes(&self.client, repo, &url).await {
                Ok(Some(data)) => data,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("{coord} from {}: {e}", repo.name);
                    last_err = Some(e.to_string());
                    continue;
                }
            };
            checksum::verify(&self.client, repo, &url, &data)
                .await
                .map_err(|e| FetchError::new(e.to_string()))?;
            let path = self
                .cache
                .put_jar(coord, &data)
                .map_err(|e| FetchError::new(format!("could not cache {coord}: {e}")))?;
            return Ok(FetchedArtifact {
                path,
                url: Some(url),
            });
        }

        Err(FetchError::new(last_err.unwrap_or_else(|| {
            let names: Vec<&str> = candidates.iter().map(|r| r.name.as_str()).collect();
            format!("not found in any repository (tried {})", names.join(", "))
        })))
    }
}
