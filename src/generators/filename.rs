//! Filename generator.

use super::sanitize_filename;
use crate::models::media::EpisodeDesignator;

/// Append an extension (without dot) when there is one.
pub fn with_extension(base: &str, extension: &str) -> String {
    if extension.is_empty() {
        base.to_string()
    } else {
        format!("{}.{}", base, extension)
    }
}

/// Generate movie main filename.
///
/// Format: `${folder}( - ${resolution})( - part${part})( - version${k}).${ext}`
///
/// `version` is only passed for the second and later files sharing the same
/// resolution and part within one movie.
pub fn generate_movie_filename(
    folder_name: &str,
    resolution: Option<&str>,
    part: Option<u32>,
    version: Option<usize>,
    extension: &str,
) -> String {
    let mut name = folder_name.to_string();

    if let Some(res) = resolution {
        name.push_str(&format!(" - {}", sanitize_filename(res)));
    }
    if let Some(part) = part {
        name.push_str(&format!(" - part{}", part));
    }
    if let Some(version) = version {
        name.push_str(&format!(" - version{}", version));
    }

    with_extension(&name, extension)
}

/// Generate episode main filename.
///
/// Format: `${series} S${seasonNr2}E${episode}( Part ${part})( - ${resolution}).${ext}`
///
/// A missing episode designator is written as `E01`.
pub fn generate_episode_filename(
    series_name: &str,
    season_number: u32,
    episode: Option<&EpisodeDesignator>,
    part: Option<u32>,
    resolution: Option<&str>,
    extension: &str,
) -> String {
    let episode_str = episode
        .map(|e| e.to_string())
        .unwrap_or_else(|| "E01".to_string());

    let mut name = format!(
        "{} S{:02}{}",
        sanitize_filename(series_name),
        season_number,
        episode_str
    );

    if let Some(part) = part {
        name.push_str(&format!(" Part {}", part));
    }
    if let Some(res) = resolution {
        name.push_str(&format!(" - {}", sanitize_filename(res)));
    }

    with_extension(&name, extension)
}
