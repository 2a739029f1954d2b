//! jvmdeps CLI binary.
//!
//! Initializes logging via `tracing`, parses arguments with `clap`, wires
//! Ctrl-C to the shutdown signal and dispatches to the command handlers.

mod cli;
mod commands;

use jvmdeps_resolver::shutdown::Shutdown;
use miette::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let shutdown = Shutdown::new();
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; letting running tasks finish");
            on_interrupt.trigger();
        }
    });

    commands::dispatch(args, shutdown).await
}
