//! Dependency graph resolution and unification: the resolver adapter and its
//! POM-backed implementation, forced-version validation, concurrent
//! orchestration, the cross-graph resolution index and conflict diagnostics.

pub mod adapter;
pub mod conflict;
pub mod index;
pub mod orchestrator;
pub mod overrides;
pub mod pom_resolver;
pub mod shutdown;
