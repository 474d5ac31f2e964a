//! Integration tests for the scanner module.
//!
//! Tests cover:
//! - Directory scanning with video files
//! - Extension filtering and nested directories
//! - File selection
//! - Error handling for non-existent paths

use jellyfin_organizer::core::metadata::MetadataExtractor;
use jellyfin_organizer::core::scanner::scan_directory;
use jellyfin_organizer::models::media::{ContentMode, ContentType, ExtraCategory};
use jellyfin_organizer::Error;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn scan(path: &Path) -> jellyfin_organizer::Result<jellyfin_organizer::core::scanner::ScanResult> {
    scan_directory(path, &MetadataExtractor::default(), ContentMode::Auto, None)
}

#[test]
fn test_scan_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let result = scan(temp_dir.path()).unwrap();

    assert_eq!(result.files.len(), 0);
    assert_eq!(result.unselected, 0);
}

#[test]
fn test_scan_with_video_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("The.Matrix.1999.1080p.mkv"), "fake video content").unwrap();

    let result = scan(temp_dir.path()).unwrap();

    assert_eq!(result.files.len(), 1);
    let file = &result.files[0];
    assert_eq!(file.filename, "The.Matrix.1999.1080p.mkv");
    assert_eq!(file.content_type, ContentType::Movie);
    assert_eq!(file.title, "The Matrix");
    assert_eq!(file.year, Some(1999));
}

#[test]
fn test_scan_with_multiple_video_types() {
    let temp_dir = TempDir::new().unwrap();

    fs::write(temp_dir.path().join("movie1.mkv"), "fake").unwrap();
    fs::write(temp_dir.path().join("movie2.MP4"), "fake").unwrap();
    fs::write(temp_dir.path().join("movie3.avi"), "fake").unwrap();
    fs::write(temp_dir.path().join("movie4.iso"), "fake").unwrap();
    fs::write(temp_dir.path().join("movie5.m4v"), "fake").unwrap();
    fs::write(temp_dir.path().join("document.txt"), "not video").unwrap();
    fs::write(temp_dir.path().join("movie1.srt"), "subtitle").unwrap();

    let result = scan(temp_dir.path()).unwrap();

    assert_eq!(result.files.len(), 4);
    assert_eq!(result.total_files_scanned, 7);
}

#[test]
fn test_scan_nested_directories() {
    let temp_dir = TempDir::new().unwrap();

    let nested = temp_dir.path().join("Breaking Bad").join("Season 1");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("Breaking.Bad.S01E03.720p.mkv"), "fake").unwrap();

    let result = scan(temp_dir.path()).unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.series_count(), 1);
    assert_eq!(result.files[0].season, Some(1));
    assert!(result.total_dirs_scanned >= 3);
}

#[test]
fn test_scan_detects_extras() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Alien (1979) - Trailer.mkv"), "fake").unwrap();
    fs::write(temp_dir.path().join("Alien (1979) - Deleted Scenes.mkv"), "fake").unwrap();

    let result = scan(temp_dir.path()).unwrap();

    let extras: Vec<_> = result.files.iter().filter_map(|f| f.extra).collect();
    assert_eq!(extras.len(), 2);
    assert!(extras.contains(&ExtraCategory::Trailers));
    assert!(extras.contains(&ExtraCategory::DeletedScenes));
}

#[test]
fn test_scan_with_selection() {
    let temp_dir = TempDir::new().unwrap();
    let keep = temp_dir.path().join("keep.mkv");
    fs::write(&keep, "fake").unwrap();
    fs::write(temp_dir.path().join("skip.mkv"), "fake").unwrap();
    let outside = temp_dir.path().join("not-scanned.mkv");

    let selection = vec![keep.clone(), outside];
    let result = scan_directory(
        temp_dir.path(),
        &MetadataExtractor::default(),
        ContentMode::Auto,
        Some(&selection),
    )
    .unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].path, keep);
    assert_eq!(result.unselected, 1);
}

#[test]
fn test_scan_nonexistent_path() {
    let result = scan(Path::new("/nonexistent/path"));
    assert!(matches!(result, Err(Error::PathNotFound(_))));
}

#[test]
fn test_scan_file_instead_of_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("movie.mkv");
    fs::write(&file, "fake").unwrap();

    let result = scan(&file);
    assert!(matches!(result, Err(Error::NotADirectory(_))));
}
