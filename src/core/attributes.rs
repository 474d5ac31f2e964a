//! Attributes derived from a guess: episode designator, part index and
//! extra category.

use crate::models::media::{EpisodeDesignator, ExtraCategory};
use regex::Regex;
use std::sync::OnceLock;

/// Collapse guessed episode numbers into a designator.
///
/// More than two episodes collapse to first and last; the episodes in
/// between do not appear in the designator. Episode 0 counts as unknown.
pub fn normalize_episode_range(episodes: &[u32]) -> Option<EpisodeDesignator> {
    let episodes: Vec<u32> = episodes.iter().copied().filter(|&n| n > 0).collect();
    match episodes.as_slice() {
        [] => None,
        [single] => Some(EpisodeDesignator::Single(*single)),
        [first, .., last] => Some(EpisodeDesignator::Range(*first, *last)),
    }
}

/// Fallback part patterns, tried in order.
fn part_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"[.\s-]part[.\s-]?(\d+)",
            r"[.\s-]pt[.\s-]?(\d+)",
            r"[.\s-]p(\d+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid part pattern"))
        .collect()
    })
}

/// Detect the part index of a file.
///
/// The guesser's own value wins; otherwise the parsing-safe filename is
/// matched (case-insensitive) against `part<N>`, `pt<N>` and `p<N>`.
/// Part 0 counts as no part.
pub fn detect_part(parsing_filename: &str, guessed: Option<u32>) -> Option<u32> {
    if let Some(part) = guessed.filter(|&n| n > 0) {
        return Some(part);
    }

    let lower = parsing_filename.to_lowercase();
    part_patterns().iter().find_map(|re| {
        re.captures(&lower)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .filter(|&n: &u32| n > 0)
    })
}

/// Map guessed tags to an extra category. First matching tag wins.
pub fn classify_extra<S: AsRef<str>>(tags: &[S]) -> Option<ExtraCategory> {
    tags.iter().find_map(|tag| {
        let tag = tag.as_ref();
        if tag.contains("Trailer") {
            Some(ExtraCategory::Trailers)
        } else if tag.contains("BehindTheScenes") || tag.contains("Featurette") {
            Some(ExtraCategory::BehindTheScenes)
        } else if tag.contains("Interview") {
            Some(ExtraCategory::Interviews)
        } else if tag.contains("Deleted") {
            Some(ExtraCategory::DeletedScenes)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_episode_range() {
        assert_eq!(normalize_episode_range(&[]), None);
        assert_eq!(
            normalize_episode_range(&[5]),
            Some(EpisodeDesignator::Single(5))
        );
        assert_eq!(
            normalize_episode_range(&[1, 2]).map(|d| d.designator()),
            Some("01-E02".to_string())
        );
        // Interior episodes are dropped.
        assert_eq!(
            normalize_episode_range(&[1, 2, 3]).map(|d| d.designator()),
            Some("01-E03".to_string())
        );
        assert_eq!(
            normalize_episode_range(&[4, 9, 7, 12]),
            Some(EpisodeDesignator::Range(4, 12))
        );
    }

    #[test]
    fn test_episode_zero_is_unknown() {
        assert_eq!(normalize_episode_range(&[0]), None);
        assert_eq!(
            normalize_episode_range(&[0, 3]),
            Some(EpisodeDesignator::Single(3))
        );
    }

    #[test]
    fn test_part_zero_is_no_part() {
        assert_eq!(detect_part("Movie.Part.0.mkv", Some(0)), None);
        assert_eq!(detect_part("Movie.Part.0.mkv", None), None);
        assert_eq!(detect_part("Movie.part2.mkv", Some(0)), Some(2));
    }

    #[test]
    fn test_detect_part_prefers_guess() {
        assert_eq!(detect_part("Movie.part2.mkv", Some(7)), Some(7));
    }

    #[test]
    fn test_detect_part_fallbacks() {
        assert_eq!(detect_part("Movie.part2.mkv", None), Some(2));
        assert_eq!(detect_part("Movie - Part 3.mkv", None), Some(3));
        assert_eq!(detect_part("Movie.PT.4.mkv", None), Some(4));
        assert_eq!(detect_part("Movie-p5.mkv", None), Some(5));
        assert_eq!(detect_part("Movie.1080p.mkv", None), None);
        assert_eq!(detect_part("Movie.mkv", None), None);
    }

    #[test]
    fn test_classify_extra() {
        assert_eq!(classify_extra(&["Trailer"]), Some(ExtraCategory::Trailers));
        assert_eq!(
            classify_extra(&["Featurette"]),
            Some(ExtraCategory::BehindTheScenes)
        );
        assert_eq!(
            classify_extra(&["BehindTheScenes"]),
            Some(ExtraCategory::BehindTheScenes)
        );
        assert_eq!(classify_extra(&["Interview"]), Some(ExtraCategory::Interviews));
        assert_eq!(
            classify_extra(&["Deleted Scene"]),
            Some(ExtraCategory::DeletedScenes)
        );
        assert_eq!(classify_extra(&["Proper", "Remux"]), None);
        assert_eq!(classify_extra::<&str>(&[]), None);
    }

    #[test]
    fn test_classify_extra_first_tag_wins_and_is_case_sensitive() {
        assert_eq!(
            classify_extra(&["Proper", "Interview", "Trailer"]),
            Some(ExtraCategory::Interviews)
        );
        assert_eq!(classify_extra(&["trailer"]), None);
    }
}
