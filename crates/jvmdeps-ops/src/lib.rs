//! Operations behind the CLI commands, plus the artifact half of the pipeline.

pub mod artifacts;
pub mod fetcher;
pub mod ops_check;
pub mod ops_generate;
pub mod render;

use std::sync::Arc;

use jvmdeps_resolver::shutdown::Shutdown;
use jvmdeps_util::progress::{NoProgress, ProgressObserver, TerminalProgress};

/// Ambient state every operation runs under.
#[derive(Clone)]
pub struct RunContext {
    pub progress: Arc<dyn ProgressObserver>,
    pub shutdown: Shutdown,
}

impl RunContext {
    /// Progress bars on stderr.
    pub fn terminal(shutdown: Shutdown) -> Self {
        Self {
            progress: Arc::new(TerminalProgress::new()),
            shutdown,
        }
    }

    /// No progress output.
    pub fn quiet() -> Self {
        Self {
            progress: Arc::new(NoProgress),
            shutdown: Shutdown::new(),
        }
    }
}
