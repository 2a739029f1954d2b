//! The `jvmdeps.toml` configuration file.
//!
//! ```toml
//! [options]
//! output = "3rdparty/jvm_deps.bzl"
//!
//! [repositories]
//! central = "https://repo.maven.apache.org/maven2"
//!
//! [dependencies."com.google.guava:guava"]
//! version = "31.1-jre"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jvmdeps_util::errors::JvmDepsError;
use serde::Deserialize;
use toml::Spanned;

use crate::coordinate::Module;
use crate::declared::{DeclaredDependency, DeclaredSet, DeclaredVersions, SourcePosition};
use crate::env;
use crate::error::PipelineError;

/// Global knobs from the `[options]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Options {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_concurrency")]
    pub resolver_concurrency: usize,
    #[serde(default = "default_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Modules whose conflicts are reported but do not fail the run.
    #[serde(default)]
    pub ignore_conflicts: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: default_output(),
            resolver_concurrency: default_concurrency(),
            fetch_concurrency: default_concurrency(),
            cache_dir: default_cache_dir(),
            ignore_conflicts: Vec::new(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("jvm_deps.bzl")
}

fn default_concurrency() -> usize {
    8
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".jvmdeps/cache")
}

/// A Maven repository reference, either a URL string or a detailed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl RepositoryEntry {
    pub fn url(&self) -> &str {
        match self {
            RepositoryEntry::Url(url) => url,
            RepositoryEntry::Detailed { url, .. } => url,
        }
    }

    fn interpolated(&self, vars: &BTreeMap<String, String>) -> Self {
        match self {
            RepositoryEntry::Url(url) => RepositoryEntry::Url(env::interpolate(url, vars)),
            RepositoryEntry::Detailed {
                url,
                username,
                password,
            } => RepositoryEntry::Detailed {
                url: env::interpolate(url, vars),
                username: username.as_deref().map(|u| env::interpolate(u, vars)),
                password: password.as_deref().map(|p| env::interpolate(p, vars)),
            },
        }
    }
}

/// Raw `[dependencies."group:artifact"]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct DependencyEntry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    versions: BTreeMap<String, String>,
    #[serde(default)]
    classifiers: Vec<String>,
    #[serde(default)]
    force_versions: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    options: Options,
    #[serde(default)]
    repositories: BTreeMap<String, RepositoryEntry>,
    #[serde(default)]
    dependencies: BTreeMap<String, Spanned<DependencyEntry>>,
}

/// A loaded, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path the configuration was read from.
    pub path: PathBuf,
    pub options: Options,
    pub repositories: BTreeMap<String, RepositoryEntry>,
    pub declared: DeclaredSet,
}

impl Config {
    /// Load and validate a configuration file.
    ///
    /// A missing file is reported as [`PipelineError::ConfigNotFound`].
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::ConfigNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        let content = std::fs::read_to_string(path).map_err(|e| JvmDepsError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let mut config = Self::from_str(path, &content)?;

        let env_file = config.root_dir().join(env::ENV_FILE_NAME);
        let vars = env::load_env_file(&env_file)?;
        config.repositories = config
            .repositories
            .iter()
            .map(|(name, entry)| (name.clone(), entry.interpolated(&vars)))
            .collect();
        tracing::debug!(
            "loaded {} ({} declared, {} repositories)",
            path.display(),
            config.declared.len(),
            config.repositories.len()
        );
        Ok(config)
    }

    /// Parse configuration text. `path` is only used for source positions.
    pub fn from_str(path: &Path, content: &str) -> miette::Result<Self> {
        let raw: ConfigFile = toml::from_str(content).map_err(|e| JvmDepsError::Config {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;

        let mut problems = Vec::new();
        if raw.options.resolver_concurrency == 0 || raw.options.fetch_concurrency == 0 {
            problems.push("concurrency options must be at least 1".to_string());
        }
        for module in &raw.options.ignore_conflicts {
            if Module::parse(module).is_none() {
                problems.push(format!(
                    "ignore-conflicts entry '{module}' must have the form group:artifact[:classifier]"
                ));
            }
        }

        let mut declared = Vec::new();
        for (key, entry) in raw.dependencies {
            let position = SourcePosition::from_offset(path, content, entry.span().start);
            match build_declared(&key, entry.into_inner(), position) {
                Ok(dep) => declared.push(dep),
                Err(mut errs) => problems.append(&mut errs),
            }
        }

        if !problems.is_empty() {
            return Err(JvmDepsError::Config {
                message: problems.join("\n"),
            }
            .into());
        }

        // Declaration order, so generated output follows the file.
        declared.sort_by(|a, b| {
            let pa = a.position.as_ref().map(|p| (p.line, p.column));
            let pb = b.position.as_ref().map(|p| (p.line, p.column));
            pa.cmp(&pb)
        });

        Ok(Self {
            path: path.to_path_buf(),
            options: raw.options,
            repositories: raw.repositories,
            declared: DeclaredSet::new(declared),
        })
    }

    /// Directory containing the configuration file; relative paths resolve against it.
    pub fn root_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.root_dir().join(&self.options.output)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root_dir().join(&self.options.cache_dir)
    }

    /// Modules excluded from the conflict gate. Entries were validated on load.
    pub fn ignored_conflicts(&self) -> Vec<Module> {
        self.options
            .ignore_conflicts
            .iter()
            .filter_map(|m| Module::parse(m))
            .collect()
    }
}

fn build_declared(
    key: &str,
    entry: DependencyEntry,
    position: SourcePosition,
) -> Result<DeclaredDependency, Vec<String>> {
    let mut problems = Vec::new();

    let module = match Module::parse(key) {
        Some(m) if m.classifier.is_none() => Some(m),
        _ => {
            problems.push(format!(
                "{position}: dependency key '{key}' must have the form group:artifact"
            ));
            None
        }
    };

    let mut versions = DeclaredVersions::default();
    if let Some(v) = entry.version {
        versions.insert(v.clone(), v);
    }
    for (alias, v) in entry.versions {
        versions.insert(alias, v);
    }
    if versions.is_empty() {
        problems.push(format!(
            "{position}: dependency '{key}' declares neither `version` nor `versions`"
        ));
    }

    let mut force_versions = BTreeMap::new();
    for (target, requested) in entry.force_versions {
        match Module::parse(&target) {
            Some(m) => {
                force_versions.insert(m, requested);
            }
            None => problems.push(format!(
                "{position}: force-versions key '{target}' must have the form group:artifact[:classifier]"
            )),
        }
    }

    let mut classifiers: Vec<Option<String>> = entry
        .classifiers
        .into_iter()
        .map(|c| Some(c).filter(|c| !c.is_empty()))
        .collect();
    classifiers.dedup();
    if classifiers.is_empty() {
        classifiers.push(None);
    }

    match module {
        Some(module) if problems.is_empty() => {
            let mut dep = DeclaredDependency::new(module, versions);
            dep.classifiers = classifiers;
            dep.force_versions = force_versions;
            dep.position = Some(position);
            Ok(dep)
        }
        _ => Err(problems),
    }
}
