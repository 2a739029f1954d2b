//! CLI argument definitions for jvmdeps.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "jvmdeps",
    version,
    about = "Resolve JVM dependencies and generate a pinned build file",
    long_about = "jvmdeps resolves the dependencies declared in jvmdeps.toml against Maven \
                  repositories, fails on unexpected transitive version conflicts, downloads \
                  and hashes every artifact, and writes a generated Starlark file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file [default: nearest jvmdeps.toml]
    #[arg(short, long, global = true, env = "JVMDEPS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve, check, fetch and write the generated build file
    Generate {
        /// Write here instead of the configured output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve and check for version conflicts without fetching or writing
    Check,
}

pub fn parse() -> Cli {
    Cli::parse()
}
