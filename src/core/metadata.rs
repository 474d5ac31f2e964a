//! Metadata extraction from filenames.
//!
//! Wraps a [`FilenameGuesser`] and makes its output safe to use:
//! - only the last dot-delimited segment is treated as the extension
//! - a failing guesser degrades to "nothing detected"
//! - the title always has a value (the filename stem when nothing better
//!   is known)

use crate::services::guesser::{FilenameGuesser, Guess, HeuristicGuesser};
use std::sync::Arc;

/// Result of extracting metadata from one filename.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Filename handed to the guesser.
    pub parsing_filename: String,
    /// Filename without its real extension.
    pub stem: String,
    /// Real extension without the dot; empty when absent.
    pub extension: String,
    /// Raw guess (empty when the guesser failed).
    pub guess: Guess,
    /// Normalized title, never empty.
    pub title: String,
}

/// Split a filename at its last dot.
///
/// `Show.S01E01.eps1.0_hellofriend.mov.1080p.mkv` splits into
/// `Show.S01E01.eps1.0_hellofriend.mov.1080p` and `mkv`.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (filename, ""),
    }
}

/// Filename with only its trailing extension treated as the extension.
pub fn parsing_filename(filename: &str) -> String {
    let (stem, ext) = split_extension(filename);
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// Trim and collapse internal whitespace.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts metadata through an injectable guesser.
#[derive(Clone)]
pub struct MetadataExtractor {
    guesser: Arc<dyn FilenameGuesser>,
}

impl MetadataExtractor {
    /// Create an extractor using `guesser`.
    pub fn new(guesser: Arc<dyn FilenameGuesser>) -> Self {
        Self { guesser }
    }

    /// Extract metadata for a filename. Never fails.
    pub fn extract(&self, filename: &str) -> Extraction {
        let (stem, extension) = split_extension(filename);
        let parsing_filename = parsing_filename(filename);

        let guess = match self.guesser.guess(&parsing_filename) {
            Ok(guess) => guess,
            Err(e) => {
                tracing::warn!("Metadata guess failed for '{}': {}", filename, e);
                Guess::default()
            }
        };

        let title = guess
            .title
            .as_deref()
            .map(normalize_title)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| normalize_title(stem));

        Extraction {
            parsing_filename,
            stem: stem.to_string(),
            extension: extension.to_string(),
            guess,
            title,
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicGuesser::new()))
    }
}

impl std::fmt::Debug for MetadataExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataExtractor").finish_non_exhaustive()
    }
}
