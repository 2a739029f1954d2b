//! Error taxonomy shared by every pipeline phase, and the aggregated error set.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::declared::SourcePosition;

fn at(position: &Option<SourcePosition>) -> String {
    match position {
        Some(p) => p.to_string(),
        None => "<no position>".to_string(),
    }
}

/// One reportable failure. None of these abort the process on their own;
/// each phase collects them into an [`ErrorSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PipelineError {
    #[error("configuration file not found: {}", .path.display())]
    #[diagnostic(
        code(jvmdeps::config_not_found),
        help("Create a jvmdeps.toml or pass --config <path>")
    )]
    ConfigNotFound { path: PathBuf },

    #[error(
        "{}: force-versions of {dependency} references undeclared module {module}",
        at(.position)
    )]
    #[diagnostic(
        code(jvmdeps::unknown_module_override),
        help("Declare {module} under [dependencies] before forcing its version")
    )]
    UnknownModuleOverride {
        dependency: String,
        module: String,
        position: Option<SourcePosition>,
    },

    #[error(
        "{}: force-versions of {dependency} requests {module} at '{version}', which is neither a declared version nor an alias of it",
        at(.position)
    )]
    #[diagnostic(code(jvmdeps::unknown_version_override))]
    UnknownVersionOverride {
        dependency: String,
        module: String,
        version: String,
        position: Option<SourcePosition>,
    },

    #[error("failed to resolve {coordinate}: {message}")]
    #[diagnostic(code(jvmdeps::resolution_failed))]
    ResolutionFailed { coordinate: String, message: String },

    #[error(
        "{}: {module} resolved to unexpected version(s) {} (declared: [{}]; introduced by {})",
        at(.position),
        .unexpected.join(", "),
        .declared.join(", "),
        .roots.join(", ")
    )]
    #[diagnostic(
        code(jvmdeps::conflicting_transitive_version),
        help("Declare the versions you accept for this module, or pin one with force-versions")
    )]
    ConflictingTransitiveVersion {
        module: String,
        unexpected: Vec<String>,
        declared: Vec<String>,
        roots: Vec<String>,
        position: Option<SourcePosition>,
    },

    #[error("failed to fetch {artifact}: {message}")]
    #[diagnostic(code(jvmdeps::artifact_fetch_failed))]
    ArtifactFetchFailed { artifact: String, message: String },

    #[error("failed to hash {artifact} at {}: {message}", .path.display())]
    #[diagnostic(code(jvmdeps::hash_computation_failed))]
    HashComputationFailed {
        artifact: String,
        path: PathBuf,
        message: String,
    },

    #[error("{task} was not started: operation interrupted")]
    #[diagnostic(code(jvmdeps::interrupted))]
    Interrupted { task: String },
}

/// The phase an [`ErrorSet`] was collected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolution,
    Conflicts,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Resolution => write!(f, "dependency resolution"),
            Stage::Conflicts => write!(f, "version conflict check"),
            Stage::Fetch => write!(f, "artifact fetch"),
        }
    }
}

/// Every failure one phase produced. Never empty.
///
/// Entries are sorted by their message so the report reads the same on every
/// run, whatever order the underlying tasks finished in. Equal entries are
/// kept: each one is a separate failure.
#[derive(Debug, Error, Diagnostic)]
#[error("{stage} failed with {} error(s)", .errors.len())]
pub struct ErrorSet {
    pub stage: Stage,
    #[related]
    pub errors: Vec<PipelineError>,
}

impl ErrorSet {
    pub fn new(stage: Stage, mut errors: Vec<PipelineError>) -> Self {
        debug_assert!(!errors.is_empty(), "an ErrorSet must carry at least one error");
        errors.sort_by_cached_key(|e| e.to_string());
        Self { stage, errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter()
    }
}
