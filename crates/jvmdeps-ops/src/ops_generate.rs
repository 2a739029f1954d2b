//! Operation: the full pipeline, ending in the generated build file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jvmdeps_core::config::Config;
use jvmdeps_maven::cache::LocalCache;
use jvmdeps_maven::download;
use jvmdeps_maven::repository::MavenRepository;
use jvmdeps_resolver::adapter::GraphResolver;
use jvmdeps_resolver::index::ResolutionIndex;
use jvmdeps_resolver::pom_resolver::PomGraphResolver;
use jvmdeps_util::errors::JvmDepsError;
use jvmdeps_util::fs::write_atomic;
use jvmdeps_util::progress::status;

use crate::artifacts::{ArtifactPipeline, ContentFetcher};
use crate::fetcher::MavenFetcher;
use crate::ops_check::check_with;
use crate::render::{BuildFileRenderer, StarlarkRenderer};
use crate::RunContext;

/// Resolve, check, fetch and render. `output` overrides the configured path.
///
/// Returns the path written.
pub async fn generate(
    config_path: &Path,
    output: Option<&Path>,
    ctx: &RunContext,
) -> miette::Result<PathBuf> {
    let config = Config::from_path(config_path)?;
    let client = download::build_client()?;
    let cache = LocalCache::new(config.cache_dir());
    let repositories = MavenRepository::from_config(&config.repositories);

    let resolver = Arc::new(PomGraphResolver::new(client.clone(), cache.clone()));
    let fetcher = Arc::new(MavenFetcher::new(client, cache, repositories));

    let path = generate_with(&config, resolver, fetcher, &StarlarkRenderer, output, ctx).await?;
    status("Generated", &path.display().to_string());
    Ok(path)
}

/// The pipeline with every collaborator injected.
///
/// The output file is written only after every phase succeeded.
pub async fn generate_with(
    config: &Config,
    resolver: Arc<dyn GraphResolver>,
    fetcher: Arc<dyn ContentFetcher>,
    renderer: &dyn BuildFileRenderer,
    output: Option<&Path>,
    ctx: &RunContext,
) -> miette::Result<PathBuf> {
    let graphs = check_with(config, resolver, ctx).await?;

    let outputs = ArtifactPipeline::new(fetcher)
        .with_concurrency(config.options.fetch_concurrency)
        .with_progress(Arc::clone(&ctx.progress))
        .with_shutdown(ctx.shutdown.clone())
        .run(&graphs)
        .await
        .into_result()?;

    let index = ResolutionIndex::build(&graphs, &config.declared);
    let text = renderer.render(&outputs, &index);

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_path());
    write_atomic(&path, text.as_bytes()).map_err(|e| JvmDepsError::Generic {
        message: format!("Failed to write {}: {e}", path.display()),
    })?;
    tracing::info!("wrote {} artifact(s) to {}", outputs.len(), path.display());
    Ok(path)
}
