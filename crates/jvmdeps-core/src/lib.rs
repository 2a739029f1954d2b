//! Core data types for jvmdeps.
//!
//! This crate defines the values every other crate passes around: module and
//! artifact coordinates, declared dependencies with their forced-version
//! overrides, the `jvmdeps.toml` configuration model, and the error taxonomy
//! shared by every pipeline phase.
//!
//! This crate is intentionally free of async code and network I/O.

/// Default configuration file name looked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "jvmdeps.toml";

pub mod config;
pub mod coordinate;
pub mod declared;
pub mod env;
pub mod error;
