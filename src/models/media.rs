//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content type of a single scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Movie => write!(f, "movie"),
            ContentType::Series => write!(f, "series"),
        }
    }
}

/// Content type requested for a run.
///
/// `Auto` classifies every file on its own; the other two force a tag onto
/// every scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    Movies,
    Tv,
    #[default]
    Auto,
}

impl ContentMode {
    /// The tag forced onto every file, if any.
    pub fn forced(self) -> Option<ContentType> {
        match self {
            ContentMode::Movies => Some(ContentType::Movie),
            ContentMode::Tv => Some(ContentType::Series),
            ContentMode::Auto => None,
        }
    }
}

impl std::fmt::Display for ContentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentMode::Movies => write!(f, "movies"),
            ContentMode::Tv => write!(f, "tv"),
            ContentMode::Auto => write!(f, "auto"),
        }
    }
}

/// Category of bonus content. Extras are kept under their original filename
/// inside a sub-folder named after the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraCategory {
    Trailers,
    BehindTheScenes,
    Interviews,
    DeletedScenes,
}

impl ExtraCategory {
    /// Sub-folder name used in the library layout.
    pub fn folder_name(self) -> &'static str {
        match self {
            ExtraCategory::Trailers => "trailers",
            ExtraCategory::BehindTheScenes => "behind the scenes",
            ExtraCategory::Interviews => "interviews",
            ExtraCategory::DeletedScenes => "deleted scenes",
        }
    }
}

impl std::fmt::Display for ExtraCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Canonical episode designator of a series file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeDesignator {
    /// A single episode, rendered as `E05`.
    Single(u32),
    /// First and last episode of a multi-episode file, rendered as `E01-E02`.
    Range(u32, u32),
}

impl EpisodeDesignator {
    /// Designator without the leading `E` (`05`, `01-E02`).
    pub fn designator(&self) -> String {
        match self {
            EpisodeDesignator::Single(n) => format!("{:02}", n),
            EpisodeDesignator::Range(first, last) => format!("{:02}-E{:02}", first, last),
        }
    }
}

impl std::fmt::Display for EpisodeDesignator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.designator())
    }
}

/// A scanned video file with everything derived from its name.
///
/// Built once by the scanner and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Full source path.
    pub path: PathBuf,
    /// File name without path.
    pub filename: String,
    /// Real (last segment) extension without the dot; empty when absent.
    pub extension: String,
    /// Movie or series.
    pub content_type: ContentType,
    /// Movie title or series name.
    pub title: String,
    /// Release year.
    pub year: Option<u16>,
    /// Season number (series only, `None` when undetected).
    pub season: Option<u32>,
    /// Episode designator (series only).
    pub episode: Option<EpisodeDesignator>,
    /// Resolution label such as `1080p`.
    pub resolution: Option<String>,
    /// Part index for files split into segments.
    pub part: Option<u32>,
    /// Bonus content category; `None` for main files.
    pub extra: Option<ExtraCategory>,
}

impl MediaFile {
    /// Whether this file is bonus content.
    pub fn is_extra(&self) -> bool {
        self.extra.is_some()
    }

    /// Season used for grouping and naming.
    pub fn season_or_default(&self) -> u32 {
        self.season.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_designator_formats() {
        assert_eq!(EpisodeDesignator::Single(5).designator(), "05");
        assert_eq!(EpisodeDesignator::Single(5).to_string(), "E05");
        assert_eq!(EpisodeDesignator::Range(1, 2).designator(), "01-E02");
        assert_eq!(EpisodeDesignator::Range(1, 2).to_string(), "E01-E02");
        assert_eq!(EpisodeDesignator::Single(112).to_string(), "E112");
    }

    #[test]
    fn test_extra_category_folder_names() {
        assert_eq!(ExtraCategory::Trailers.folder_name(), "trailers");
        assert_eq!(ExtraCategory::BehindTheScenes.folder_name(), "behind the scenes");
        assert_eq!(ExtraCategory::Interviews.folder_name(), "interviews");
        assert_eq!(ExtraCategory::DeletedScenes.folder_name(), "deleted scenes");
    }

    #[test]
    fn test_content_mode_forced() {
        assert_eq!(ContentMode::Movies.forced(), Some(ContentType::Movie));
        assert_eq!(ContentMode::Tv.forced(), Some(ContentType::Series));
        assert_eq!(ContentMode::Auto.forced(), None);
        assert_eq!(ContentMode::default(), ContentMode::Auto);
    }
}
