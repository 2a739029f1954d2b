//! Maven repository abstraction: URL layout and credentials.

use std::collections::BTreeMap;

use jvmdeps_core::config::RepositoryEntry;
use jvmdeps_core::coordinate::Coordinate;

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// A configured Maven repository with optional credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenRepository {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MavenRepository {
    /// Build a `MavenRepository` from a name and a config `RepositoryEntry`.
    pub fn from_entry(name: &str, entry: &RepositoryEntry) -> Self {
        let (username, password) = match entry {
            RepositoryEntry::Url(_) => (None, None),
            RepositoryEntry::Detailed {
                username, password, ..
            } => (
                username.clone().filter(|u| !u.is_empty()),
                password.clone().filter(|p| !p.is_empty()),
            ),
        };
        Self {
            name: name.to_string(),
            url: entry.url().trim_end_matches('/').to_string(),
            username,
            password,
        }
    }

    /// Construct the default Maven Central repository.
    pub fn maven_central() -> Self {
        Self {
            name: "central".to_string(),
            url: MAVEN_CENTRAL_URL.to_string(),
            username: None,
            password: None,
        }
    }

    /// Configured repositories in name order, or Maven Central alone when none are configured.
    pub fn from_config(entries: &BTreeMap<String, RepositoryEntry>) -> Vec<Self> {
        if entries.is_empty() {
            return vec![Self::maven_central()];
        }
        entries
            .iter()
            .map(|(name, entry)| Self::from_entry(name, entry))
            .collect()
    }

    /// Standard Maven layout directory for a coordinate.
    ///
    /// `org.jetbrains.kotlinx:kotlinx-coroutines-core:1.8.0` becomes
    /// `org/jetbrains/kotlinx/kotlinx-coroutines-core/1.8.0`
    pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
        format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
    }

    /// Full URL to a specific file within the Maven repository.
    pub fn file_url(&self, group: &str, artifact: &str, version: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.url,
            Self::coordinate_path(group, artifact, version),
            filename
        )
    }

    /// URL to the POM file for a given coordinate. Classifiers share one POM.
    pub fn pom_url(&self, group: &str, artifact: &str, version: &str) -> String {
        let filename = format!("{artifact}-{version}.pom");
        self.file_url(group, artifact, version, &filename)
    }

    /// URL to the JAR file for a given coordinate.
    pub fn jar_url(&self, coord: &Coordinate) -> String {
        self.file_url(
            &coord.group,
            &coord.artifact,
            &coord.version,
            &coord.jar_file_name(),
        )
    }

    /// Whether this repository has authentication configured.
    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}
