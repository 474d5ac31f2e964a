//! CLI command implementations.

pub mod interactive;
pub mod organize;
