use miette::Diagnostic;
use thiserror::Error;

/// Fatal, non-aggregated faults shared by all jvmdeps crates.
#[derive(Debug, Error, Diagnostic)]
pub enum JvmDepsError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed configuration file.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your jvmdeps.toml for syntax errors"))]
    Config { message: String },

    /// HTTP client setup or a request failed outside of a collected phase.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Run every independent result to completion and keep them all.
///
/// Returns every success in input order when nothing failed, otherwise every
/// failure in input order. Never stops at the first error.
pub fn collect_all<T, E>(results: impl IntoIterator<Item = Result<T, E>>) -> Result<Vec<T>, Vec<E>> {
    let mut oks = Vec::new();
    let mut errs = Vec::new();
    for result in results {
        match result {
            Ok(value) => oks.push(value),
            Err(err) => errs.push(err),
        }
    }
    if errs.is_empty() {
        Ok(oks)
    } else {
        Err(errs)
    }
}
