//! Integration tests for the path planner.
//!
//! Tests cover:
//! - Jellyfin layout for movies, episodes and extras
//! - Version numbering and collision suffixes
//! - Plan-wide invariants (one entry per file, distinct targets)

use jellyfin_organizer::core::grouping::Grouping;
use jellyfin_organizer::core::metadata::MetadataExtractor;
use jellyfin_organizer::core::planner::{validate_no_duplicate_targets, PathPlanner, PlannerOptions};
use jellyfin_organizer::core::scanner::describe_file;
use jellyfin_organizer::models::media::{ContentMode, MediaFile};
use jellyfin_organizer::models::plan::{FileOperation, Plan};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn describe_all(names: &[&str]) -> Vec<MediaFile> {
    let extractor = MetadataExtractor::default();
    names
        .iter()
        .map(|name| describe_file(&extractor, &Path::new("/in").join(name), ContentMode::Auto))
        .collect()
}

fn plan(names: &[&str], target: &Path, downmix_audio: bool) -> Plan {
    let planner = PathPlanner::new(PlannerOptions {
        downmix_audio,
        create_folders: true,
    });
    planner.plan(&Grouping::build(&describe_all(names)), Path::new("/in"), target)
}

fn relative_targets(plan: &Plan, root: &Path) -> Vec<PathBuf> {
    plan.entries
        .iter()
        .map(|e| e.target.strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

#[test]
fn test_breaking_bad_multi_episode() {
    let lib = TempDir::new().unwrap();
    let plan = plan(&["Breaking.Bad.S01E01-E02.720p.BluRay.x264.mkv"], lib.path(), false);

    assert_eq!(
        relative_targets(&plan, lib.path()),
        vec![PathBuf::from("Shows/Breaking Bad/Season 01/Breaking Bad S01E01-E02 - 720p.mkv")]
    );
    assert_eq!(plan.entries[0].operation, FileOperation::Move);
    assert!(lib.path().join("Shows/Breaking Bad/Season 01").is_dir());
}

#[test]
fn test_two_avatar_copies_get_version_suffix() {
    let lib = TempDir::new().unwrap();
    let plan = plan(
        &["Avatar.2009.1080p.BluRay.mkv", "Avatar (2009) 1080p.mkv"],
        lib.path(),
        false,
    );

    assert_eq!(
        relative_targets(&plan, lib.path()),
        vec![
            PathBuf::from("Movies/Avatar (2009)/Avatar (2009) - 1080p.mkv"),
            PathBuf::from("Movies/Avatar (2009)/Avatar (2009) - 1080p - version2.mkv"),
        ]
    );
    assert!(plan.entries.iter().all(|e| e.operation == FileOperation::Copy));
}

#[test]
fn test_existing_targets_get_numbered_suffixes() {
    let lib = TempDir::new().unwrap();
    let folder = lib.path().join("Movies/Avatar (2009)");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("Avatar (2009) - 1080p.mkv"), "old").unwrap();
    fs::write(folder.join("Avatar (2009) - 1080p_1.mkv"), "old").unwrap();

    let plan = plan(&["Avatar.2009.1080p.mkv"], lib.path(), false);

    assert_eq!(
        plan.entries[0].target,
        folder.join("Avatar (2009) - 1080p_2.mkv")
    );
}

#[test]
fn test_extras_keep_original_name_and_skip_transcode() {
    let lib = TempDir::new().unwrap();
    let plan = plan(
        &[
            "Dune (2021) 2160p.mkv",
            "Dune (2021) - Trailer.mkv",
            "Show.S02E04.mkv",
            "Show.S02 Behind The Scenes.mkv",
        ],
        lib.path(),
        true,
    );

    let targets = relative_targets(&plan, lib.path());
    assert!(targets.contains(&PathBuf::from("Movies/Dune (2021)/Dune (2021) - 2160p.mkv")));
    assert!(targets.contains(&PathBuf::from(
        "Movies/Dune (2021)/trailers/Dune (2021) - Trailer.mkv"
    )));
    assert!(targets.contains(&PathBuf::from("Shows/Show/Season 02/Show S02E04.mkv")));
    assert!(targets.contains(&PathBuf::from(
        "Shows/Show/Season 02/behind the scenes/Show.S02 Behind The Scenes.mkv"
    )));

    for entry in &plan.entries {
        assert_eq!(entry.is_extra, entry.source.is_extra());
        assert_eq!(entry.needs_transcode, !entry.is_extra);
    }

    let show_main = plan.main_entries().find(|e| e.source.filename == "Show.S02E04.mkv").unwrap();
    assert_eq!(show_main.operation, FileOperation::Copy);
    let show_extra = plan
        .extra_entries()
        .find(|e| e.source.filename.starts_with("Show"))
        .unwrap();
    assert_eq!(show_extra.operation, FileOperation::Move);
}

#[test]
fn test_missing_season_defaults_to_one() {
    let extractor = MetadataExtractor::default();
    let file = describe_file(&extractor, Path::new("/in/Pilot Episode 1.mkv"), ContentMode::Tv);
    assert!(file.season.is_none());

    let planner = PathPlanner::new(PlannerOptions {
        downmix_audio: false,
        create_folders: false,
    });
    let plan = planner.plan(&Grouping::build(&[file]), Path::new("/in"), Path::new("/lib"));

    assert_eq!(
        plan.entries[0].target,
        PathBuf::from("/lib/Shows/Pilot/Season 01/Pilot S01E01.mkv")
    );
}

#[test]
fn test_every_file_planned_once_with_distinct_targets() {
    let lib = TempDir::new().unwrap();
    let names = [
        "Avatar.2009.1080p.mkv",
        "Avatar.2009.1080p.x265.mkv",
        "Avatar.2009.720p.mkv",
        "The.Hobbit.2012.1080p.Part1.mkv",
        "The.Hobbit.2012.1080p.Part2.mkv",
        "Show.S01E01.mkv",
        "Show.S01E01.PROPER.mkv",
        "Show.S01E02-E04.mkv",
        "Show.S03E01.mkv",
        "Trailer.mkv",
        "Home Video.mp4",
    ];
    let plan = plan(&names, lib.path(), false);

    assert_eq!(plan.entries.len(), names.len());
    assert!(plan.failures.is_empty());

    let sources: HashSet<_> = plan.entries.iter().map(|e| e.source.path.clone()).collect();
    assert_eq!(sources.len(), names.len());

    let targets: HashSet<_> = plan.entries.iter().map(|e| e.target.clone()).collect();
    assert_eq!(targets.len(), names.len());
    assert!(validate_no_duplicate_targets(&plan).is_ok());

    let targets = relative_targets(&plan, lib.path());
    assert!(targets.contains(&PathBuf::from("Shows/Show/Season 01/Show S01E01_1.mkv")));
    assert!(targets.contains(&PathBuf::from("Shows/Show/Season 01/Show S01E02-E04.mkv")));
    assert!(targets.contains(&PathBuf::from(
        "Movies/The Hobbit (2012)/The Hobbit (2012) - 1080p - part2.mkv"
    )));
}

#[test]
fn test_dry_run_does_not_create_folders() {
    let lib = TempDir::new().unwrap();
    let planner = PathPlanner::new(PlannerOptions {
        downmix_audio: false,
        create_folders: false,
    });
    let plan = planner.plan(
        &Grouping::build(&describe_all(&["Avatar.2009.1080p.mkv"])),
        Path::new("/in"),
        lib.path(),
    );

    assert_eq!(plan.entries.len(), 1);
    assert!(!lib.path().join("Movies").exists());
}
