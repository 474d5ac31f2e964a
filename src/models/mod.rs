//! Data models.

pub mod config;
pub mod event;
pub mod media;
pub mod plan;
