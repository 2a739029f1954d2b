//! Command dispatch and handler modules.

mod check;
mod generate;

use std::path::PathBuf;

use jvmdeps_core::CONFIG_FILE_NAME;
use jvmdeps_ops::RunContext;
use jvmdeps_resolver::shutdown::Shutdown;
use jvmdeps_util::errors::JvmDepsError;
use jvmdeps_util::fs::find_ancestor_with;
use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli, shutdown: Shutdown) -> Result<()> {
    let config = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let ctx = RunContext::terminal(shutdown);

    match cli.command {
        Command::Generate { output } => generate::exec(&config, output.as_deref(), &ctx).await,
        Command::Check => check::exec(&config, &ctx).await,
    }
}

/// The nearest `jvmdeps.toml` at or above the working directory, or the
/// working directory's own path when there is none.
fn default_config_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(JvmDepsError::Io)?;
    let dir = find_ancestor_with(&cwd, CONFIG_FILE_NAME).unwrap_or(cwd);
    Ok(dir.join(CONFIG_FILE_NAME))
}
