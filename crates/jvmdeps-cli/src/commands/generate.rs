//! Handler for `jvmdeps generate`.

use std::path::Path;

use jvmdeps_ops::RunContext;
use miette::Result;

pub async fn exec(config: &Path, output: Option<&Path>, ctx: &RunContext) -> Result<()> {
    jvmdeps_ops::ops_generate::generate(config, output, ctx).await?;
    Ok(())
}
