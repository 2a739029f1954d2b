use std::fmt;
use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Print a Cargo-style status line: `   Generated 3rdparty/jvm_deps.bzl`
///
/// The `label` is right-padded to 12 characters and printed in bold green,
/// followed by the `message` in the default terminal colour.
pub fn status(label: &str, message: &str) {
    let green_bold = Style::new().green().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        green_bold.apply_to(label),
    );
}

/// Print a warning-style status line (bold yellow label).
pub fn status_warn(label: &str, message: &str) {
    let yellow_bold = Style::new().yellow().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        yellow_bold.apply_to(label),
    );
}

/// The pipeline phase a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Resolve,
    Fetch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Resolve => write!(f, "Resolving"),
            Phase::Fetch => write!(f, "Fetching"),
        }
    }
}

/// Receives `completed / total` counts as tasks finish.
///
/// Purely advisory: implementations must not influence the outcome of the
/// phase being observed.
pub trait ProgressObserver: Send + Sync {
    fn update(&self, phase: Phase, completed: usize, total: usize);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn update(&self, _phase: Phase, _completed: usize, _total: usize) {}
}

/// Renders one `indicatif` bar per phase on stderr.
pub struct TerminalProgress {
    resolve: ProgressBar,
    fetch: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            resolve: progress_bar(0, &Phase::Resolve.to_string()),
            fetch: progress_bar(0, &Phase::Fetch.to_string()),
        }
    }

    fn bar(&self, phase: Phase) -> &ProgressBar {
        match phase {
            Phase::Resolve => &self.resolve,
            Phase::Fetch => &self.fetch,
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TerminalProgress {
    fn update(&self, phase: Phase, completed: usize, total: usize) {
        let bar = self.bar(phase);
        if bar.is_hidden() && total > 0 {
            bar.set_draw_target(ProgressDrawTarget::stderr());
        }
        bar.set_length(total as u64);
        bar.set_position(completed as u64);
        if completed >= total {
            bar.finish_and_clear();
        }
    }
}

/// Create a progress bar with the given length and message for determinate progress.
///
/// The bar starts hidden; callers attach a draw target once there is work to show.
pub fn progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:>12} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb.set_message(message.to_string());
    pb
}
