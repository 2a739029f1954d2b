//! Local artifact cache mirroring Maven repository layout.

use std::fs;
use std::path::{Path, PathBuf};

use jvmdeps_core::coordinate::Coordinate;
use jvmdeps_util::errors::JvmDepsError;
use jvmdeps_util::fs::write_atomic;

use crate::pom::{self, Pom};
use crate::repository::MavenRepository;

/// Artifact cache rooted at the configured `cache-dir`.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one `group:artifact:version`.
    pub fn artifact_dir(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.root
            .join(group.replace('.', "/"))
            .join(artifact)
            .join(version)
    }

    /// Where the JAR for `coord` lives in the cache, present or not.
    pub fn jar_path(&self, coord: &Coordinate) -> PathBuf {
        self.artifact_dir(&coord.group, &coord.artifact, &coord.version)
            .join(coord.jar_file_name())
    }

    fn pom_path(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.artifact_dir(group, artifact, version)
            .join(format!("{artifact}-{version}.pom"))
    }

    /// Cached JAR path, if present.
    pub fn get_jar(&self, coord: &Coordinate) -> Option<PathBuf> {
        let path = self.jar_path(coord);
        path.is_file().then_some(path)
    }

    /// Cached and parsed POM, if present and well-formed.
    pub fn get_pom(&self, group: &str, artifact: &str, version: &str) -> Option<Pom> {
        let path = self.pom_path(group, artifact, version);
        let content = fs::read_to_string(&path).ok()?;
        match pom::parse_pom(&content) {
            Ok(pom) => Some(pom),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached POM {}: {e}", path.display());
                None
            }
        }
    }

    /// Store a JAR through an atomic rename.
    pub fn put_jar(&self, coord: &Coordinate, data: &[u8]) -> miette::Result<PathBuf> {
        let path = self.jar_path(coord);
        self.put(&path, data)?;
        Ok(path)
    }

    pub fn put_pom(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
        pom_xml: &str,
    ) -> miette::Result<PathBuf> {
        let path = self.pom_path(group, artifact, version);
        self.put(&path, pom_xml.as_bytes())?;
        Ok(path)
    }

    fn put(&self, path: &Path, data: &[u8]) -> miette::Result<()> {
        write_atomic(path, data).map_err(JvmDepsError::Io)?;
        Ok(())
    }

    /// Fetch or download a POM, using the cache when available.
    pub async fn fetch_pom(
        &self,
        client: &reqwest::Client,
        repo: &MavenRepository,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> miette::Result<Option<Pom>> {
        if let Some(pom) = self.get_pom(group, artifact, version) {
            return Ok(Some(pom));
        }

        let url = repo.pom_url(group, artifact, version);
        match crate::download::download_text(client, repo, &url).await? {
            Some(content) => {
                let pom = pom::parse_pom(&content)?;
                self.put_pom(group, artifact, version, &content)?;
                Ok(Some(pom))
            }
            None => Ok(None),
        }
    }
}
