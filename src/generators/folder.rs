//! Folder name generator.

use super::sanitize_filename;

/// Library sub-folder holding movies.
pub const MOVIES_DIR: &str = "Movies";

/// Library sub-folder holding series.
pub const SHOWS_DIR: &str = "Shows";

/// Name with an optional ` (Year)` suffix.
fn with_year(name: &str, year: Option<u16>) -> String {
    match year {
        Some(year) => format!("{} ({})", sanitize_filename(name), year),
        None => sanitize_filename(name),
    }
}

/// Generate movie folder name.
///
/// Format: `${title}( (${year}))`
pub fn generate_movie_folder(title: &str, year: Option<u16>) -> String {
    with_year(title, year)
}

/// Generate series folder name.
///
/// Format: `${series}( (${year}))`
pub fn generate_series_folder(name: &str, year: Option<u16>) -> String {
    with_year(name, year)
}

/// Generate season folder name.
///
/// Format: `Season ${seasonNr2}`
pub fn generate_season_folder(season_number: u32) -> String {
    format!("Season {:02}", season_number)
}
