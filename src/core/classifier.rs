//! Movie vs. series classification.

use crate::models::media::ContentType;
use crate::services::guesser::Guess;
use regex::Regex;
use std::sync::OnceLock;

fn series_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"(?i)S\d{1,2}E\d{1,2}", r"(?i)Season\s*\d+", r"(?i)Episode\s*\d+"]
            .iter()
            .map(|p| Regex::new(p).expect("valid series pattern"))
            .collect()
    })
}

/// Classify a file as movie or series.
///
/// A guessed season or episode means series; otherwise the filename is
/// checked for `SxxEyy`, `Season N` or `Episode N`. Anything else is a movie.
pub fn classify(filename: &str, guess: &Guess) -> ContentType {
    if guess.season.is_some() || !guess.episodes.is_empty() {
        return ContentType::Series;
    }

    if series_patterns().iter().any(|re| re.is_match(filename)) {
        return ContentType::Series;
    }

    ContentType::Movie
}
