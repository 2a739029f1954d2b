//! Operation: resolve every declared dependency and run the conflict gate.
//!
//! Nothing is downloaded beyond POMs and nothing is written.

use std::path::Path;
use std::sync::Arc;

use jvmdeps_core::config::Config;
use jvmdeps_maven::cache::LocalCache;
use jvmdeps_maven::download;
use jvmdeps_maven::repository::MavenRepository;
use jvmdeps_resolver::adapter::{GraphResolver, ResolvedGraph};
use jvmdeps_resolver::conflict;
use jvmdeps_resolver::index::ResolutionIndex;
use jvmdeps_resolver::orchestrator::ResolutionOrchestrator;
use jvmdeps_resolver::pom_resolver::PomGraphResolver;
use jvmdeps_util::progress::{status, status_warn};

use crate::RunContext;

/// Check the configuration at `config_path` against the configured repositories.
pub async fn check(config_path: &Path, ctx: &RunContext) -> miette::Result<()> {
    let config = Config::from_path(config_path)?;
    let client = download::build_client()?;
    let resolver = Arc::new(PomGraphResolver::new(
        client,
        LocalCache::new(config.cache_dir()),
    ));

    let graphs = check_with(&config, resolver, ctx).await?;
    status(
        "Checked",
        &format!(
            "{} declared, {} resolved, no version conflicts",
            config.declared.len(),
            graphs.len()
        ),
    );
    Ok(())
}

/// Resolve with the given resolver, then fail on any version conflict not
/// covered by `ignore-conflicts`. Returns the graphs in declaration order.
pub async fn check_with(
    config: &Config,
    resolver: Arc<dyn GraphResolver>,
    ctx: &RunContext,
) -> miette::Result<Vec<ResolvedGraph>> {
    let repositories = MavenRepository::from_config(&config.repositories);
    let graphs = ResolutionOrchestrator::new(resolver, repositories)
        .with_concurrency(config.options.resolver_concurrency)
        .with_progress(Arc::clone(&ctx.progress))
        .with_shutdown(ctx.shutdown.clone())
        .resolve_all(&config.declared)
        .await?;

    let index = ResolutionIndex::build(&graphs, &config.declared);
    let report = conflict::diagnose(&index);
    tracing::debug!("{report}");
    let found = report.len();
    let report = report.without(&config.ignored_conflicts());
    if report.len() < found {
        status_warn(
            "Ignored",
            &format!(
                "{} version conflict(s) listed in ignore-conflicts",
                found - report.len()
            ),
        );
    }
    report.into_result()?;

    Ok(graphs)
}
