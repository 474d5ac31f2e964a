//! Core business logic modules.

pub mod attributes;
pub mod classifier;
pub mod executor;
pub mod grouping;
pub mod metadata;
pub mod pipeline;
pub mod planner;
pub mod scanner;
pub mod transcoder;
