//! Helpers shared by the demos: environment-driven tracing and broker URL.

pub mod config;
pub mod tracing;
