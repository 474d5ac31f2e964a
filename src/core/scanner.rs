//! Directory scanner module.
//!
//! Walks the source tree for video files and turns each one into an
//! immutable [`MediaFile`] by running metadata extraction, classification
//! and attribute derivation.

use crate::core::attributes::{classify_extra, detect_part, normalize_episode_range};
use crate::core::classifier;
use crate::core::metadata::MetadataExtractor;
use crate::models::media::{ContentMode, ContentType, MediaFile};
use crate::utils::fs::ensure_directory;
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized video file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "iso"];

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files found, in scan order.
    pub files: Vec<MediaFile>,
    /// Video files left out because they were not selected.
    pub unselected: usize,
    /// Total files scanned.
    pub total_files_scanned: usize,
    /// Total directories scanned.
    pub total_dirs_scanned: usize,
}

impl ScanResult {
    /// Number of files classified as movies.
    pub fn movie_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.content_type == ContentType::Movie)
            .count()
    }

    /// Number of files classified as series.
    pub fn series_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.content_type == ContentType::Series)
            .count()
    }
}

/// Check if a file extension is a video format.
pub fn is_video_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    VIDEO_EXTENSIONS.contains(&ext_lower.as_str())
}

/// Check if a path looks like a video file.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_video_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

/// List video files under `path`, sorted by walk order.
///
/// Returns the video paths plus (files scanned, directories scanned).
pub fn list_video_files(path: &Path) -> Result<(Vec<PathBuf>, usize, usize)> {
    ensure_directory(path)?;

    let mut videos = Vec::new();
    let mut files_scanned = 0;
    let mut dirs_scanned = 0;

    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(crate::Error::Scan {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            dirs_scanned += 1;
        } else if entry.file_type().is_file() {
            files_scanned += 1;
            if is_video_file(entry.path()) {
                videos.push(entry.into_path());
            }
        }
    }

    Ok((videos, files_scanned, dirs_scanned))
}

/// Build the media file for one video path.
pub fn describe_file(extractor: &MetadataExtractor, path: &Path, mode: ContentMode) -> MediaFile {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let extraction = extractor.extract(&filename);
    let guess = &extraction.guess;

    let content_type = mode
        .forced()
        .unwrap_or_else(|| classifier::classify(&filename, guess));

    let (season, episode) = match content_type {
        ContentType::Series => (guess.season, normalize_episode_range(&guess.episodes)),
        ContentType::Movie => (None, None),
    };

    let file = MediaFile {
        path: path.to_path_buf(),
        extension: extraction.extension.clone(),
        content_type,
        title: extraction.title.clone(),
        year: guess.year,
        season,
        episode,
        resolution: guess.screen_size.clone(),
        part: detect_part(&extraction.parsing_filename, guess.part),
        extra: classify_extra(&guess.other),
        filename,
    };

    tracing::debug!(
        "{} -> {} '{}' year={:?} season={:?} episode={:?} extra={:?}",
        file.filename,
        file.content_type,
        file.title,
        file.year,
        file.season,
        file.episode,
        file.extra
    );

    file
}

/// Canonical form used to match selected paths against scanned ones.
fn selection_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Scan a directory and describe every video file in it.
///
/// # Arguments
/// * `path` - The directory path to scan
/// * `extractor` - Metadata extractor used for every file
/// * `mode` - Forced content type or auto-detection
/// * `selection` - Optional subset of source files to keep
pub fn scan_directory(
    path: &Path,
    extractor: &MetadataExtractor,
    mode: ContentMode,
    selection: Option<&[PathBuf]>,
) -> Result<ScanResult> {
    let (videos, total_files_scanned, total_dirs_scanned) = list_video_files(path)?;

    let selected: Option<HashSet<PathBuf>> =
        selection.map(|paths| paths.iter().map(|p| selection_key(p)).collect());

    let mut result = ScanResult {
        total_files_scanned,
        total_dirs_scanned,
        ..Default::default()
    };

    for video in videos {
        if let Some(ref selected) = selected {
            if !selected.contains(&selection_key(&video)) {
                result.unselected += 1;
                continue;
            }
        }
        result.files.push(describe_file(extractor, &video, mode));
    }

    tracing::info!(
        "Scanned {} files in {} directories: {} movies, {} series, {} not selected",
        result.total_files_scanned,
        result.total_dirs_scanned,
        result.movie_count(),
        result.series_count(),
        result.unselected
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::{EpisodeDesignator, ExtraCategory};

    #[test]
    fn test_is_video_extension() {
        assert!(is_video_extension("mkv"));
        assert!(is_video_extension("MKV"));
        assert!(is_video_extension("mp4"));
        assert!(is_video_extension("iso"));
        assert!(is_video_extension("wmv"));
        assert!(!is_video_extension("m4v"));
        assert!(!is_video_extension("txt"));
        assert!(!is_video_extension("srt"));
    }

    #[test]
    fn test_describe_series_file() {
        let extractor = MetadataExtractor::default();
        let file = describe_file(
            &extractor,
            Path::new("/src/Breaking.Bad.S01E01-E02.720p.BluRay.x264.mkv"),
            ContentMode::Auto,
        );

        assert_eq!(file.content_type, ContentType::Series);
        assert_eq!(file.title, "Breaking Bad");
        assert_eq!(file.season, Some(1));
        assert_eq!(file.episode, Some(EpisodeDesignator::Range(1, 2)));
        assert_eq!(file.resolution.as_deref(), Some("720p"));
        assert_eq!(file.extension, "mkv");
        assert!(!file.is_extra());
    }

    #[test]
    fn test_describe_movie_extra() {
        let extractor = MetadataExtractor::default();
        let file = describe_file(
            &extractor,
            Path::new("/src/The Matrix (1999) 1080p - Trailer.mkv"),
            ContentMode::Auto,
        );

        assert_eq!(file.content_type, ContentType::Movie);
        assert_eq!(file.title, "The Matrix");
        assert_eq!(file.year, Some(1999));
        assert_eq!(file.extra, Some(ExtraCategory::Trailers));
        assert!(file.season.is_none());
    }

    #[test]
    fn test_forced_content_type() {
        let extractor = MetadataExtractor::default();
        let file = describe_file(
            &extractor,
            Path::new("/src/Home Video.mp4"),
            ContentMode::Tv,
        );
        assert_eq!(file.content_type, ContentType::Series);
        assert_eq!(file.season_or_default(), 1);

        let file = describe_file(
            &extractor,
            Path::new("/src/Show.S02E03.mkv"),
            ContentMode::Movies,
        );
        assert_eq!(file.content_type, ContentType::Movie);
        assert!(file.episode.is_none());
    }

    // Integration tests for scan_directory() live in tests/scanner_tests.rs
}
