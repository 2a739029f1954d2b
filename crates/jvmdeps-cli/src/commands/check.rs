//! Handler for `jvmdeps check`.

use std::path::Path;

use jvmdeps_ops::RunContext;
use miette::Result;

pub async fn exec(config: &Path, ctx: &RunContext) -> Result<()> {
    jvmdeps_ops::ops_check::check(config, ctx).await
}
