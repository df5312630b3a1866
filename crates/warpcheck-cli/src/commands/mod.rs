//! CLI command implementations.

pub mod check;
pub mod config;
pub mod stats;
pub mod vectors;
pub mod version;
