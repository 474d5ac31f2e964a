//! Jellyfin Organizer Library
//!
//! Classifies, groups and lays out movies and TV shows into a
//! Jellyfin-compatible library, with optional stereo audio downmixing.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
