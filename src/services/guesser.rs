//! Filename guessing capability.
//!
//! Turns a release-style filename into a best-effort [`Guess`]. Every field
//! of a guess is optional and may be wrong; callers are expected to treat the
//! result as a hint and fall back when it is missing.

use crate::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Structured but partial guess for a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    /// Movie title or series name.
    pub title: Option<String>,
    /// Release year.
    pub year: Option<u16>,
    /// Season number.
    pub season: Option<u32>,
    /// Episode numbers in order; empty when none were found.
    pub episodes: Vec<u32>,
    /// Screen size such as `1080p`.
    pub screen_size: Option<String>,
    /// Part index.
    pub part: Option<u32>,
    /// Other tags (`Trailer`, `Featurette`, `Proper`, ...).
    pub other: Vec<String>,
}

/// Something that can guess metadata from a filename.
pub trait FilenameGuesser: Send + Sync {
    /// Guess metadata for a filename (including its extension).
    fn guess(&self, filename: &str) -> Result<Guess>;
}

struct Patterns {
    release_group: Regex,
    episode: Regex,
    episode_continuation: Regex,
    cross: Regex,
    season_word: Regex,
    episode_word: Regex,
    season_only: Regex,
    year: Regex,
    resolution: Regex,
    uhd: Regex,
    part: Regex,
    technical: Regex,
    tags: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid guesser pattern");
        Patterns {
            release_group: re(r"^\s*\[[^\]]*\]\s*"),
            // A bare "-NN" range end must hug the dash; " - 10 Things" is a title.
            episode: re(
                r"(?i)\bS(\d{1,2})\s?E(\d{1,3})((?:-E?\d{1,3}\b|\s?-\s?E\d{1,3}\b|\s?E\d{1,3})*)",
            ),
            episode_continuation: re(r"(?i)(-)?\s?E?(\d{1,3})"),
            cross: re(r"(?i)\b(\d{1,2})x(\d{2,3})\b"),
            season_word: re(r"(?i)\bSeason\s?(\d{1,2})\b"),
            episode_word: re(r"(?i)\bEpisode\s?(\d{1,3})\b"),
            season_only: re(r"(?i)\bS(\d{1,2})\b"),
            year: re(r"\b(19\d{2}|20\d{2})\b"),
            resolution: re(r"(?i)\b(\d{3,4})([pi])\b"),
            uhd: re(r"(?i)\b(4k|uhd)\b"),
            part: re(r"(?i)\bpart\s?(\d{1,2})\b"),
            technical: re(
                r"(?i)\b(blu-?ray|bdrip|brrip|web-?dl|webrip|web|hdtv|dvdrip|dvd|x264|x265|h264|h265|hevc|xvid|aac|ac3|dts|10bit|hdr|version\s?\d+)\b",
            ),
            tags: vec![
                (re(r"(?i)\btrailers?\b"), "Trailer"),
                (re(r"(?i)\bfeaturettes?\b"), "Featurette"),
                (re(r"(?i)\bbehind\s?the\s?scenes\b"), "BehindTheScenes"),
                (re(r"(?i)\binterviews?\b"), "Interview"),
                (re(r"(?i)\bdeleted\s?scenes?\b"), "Deleted Scene"),
                (re(r"(?i)\bproper\b"), "Proper"),
                (re(r"(?i)\brepack\b"), "Repack"),
                (re(r"(?i)\bremux\b"), "Remux"),
            ],
        }
    })
}

/// Regex based guesser for scene-style and plain filenames.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGuesser;

impl HeuristicGuesser {
    pub fn new() -> Self {
        Self
    }
}

impl FilenameGuesser for HeuristicGuesser {
    fn guess(&self, filename: &str) -> Result<Guess> {
        let p = patterns();
        let stem = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(filename);

        let cleaned = stem.replace(['.', '_'], " ");
        let cleaned = p.release_group.replace(&cleaned, "");
        let name = cleaned.trim();
        if name.is_empty() {
            return Err(crate::Error::Guess(filename.to_string()));
        }

        let mut guess = Guess::default();
        // Start of the first technical marker; the title is whatever precedes it.
        let mut title_end = name.len();
        let mut mark = |start: usize| title_end = title_end.min(start);

        if let Some(caps) = p.episode.captures(name) {
            mark(caps.get(0).map_or(0, |m| m.start()));
            guess.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            if let Some(first) = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()) {
                guess.episodes.push(first);
            }
            if let Some(rest) = caps.get(3) {
                for cont in p.episode_continuation.captures_iter(rest.as_str()) {
                    let Some(n) = cont.get(2).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                        continue;
                    };
                    let last = guess.episodes.last().copied().unwrap_or(n);
                    if cont.get(1).is_some() && n > last {
                        guess.episodes.extend(last + 1..=n);
                    } else {
                        guess.episodes.push(n);
                    }
                }
            }
        } else if let Some(caps) = p.cross.captures(name) {
            mark(caps.get(0).map_or(0, |m| m.start()));
            guess.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            guess.episodes.extend(caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()));
        } else {
            if let Some(caps) = p.season_word.captures(name) {
                mark(caps.get(0).map_or(0, |m| m.start()));
                guess.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            } else if let Some(caps) = p.season_only.captures(name) {
                mark(caps.get(0).map_or(0, |m| m.start()));
                guess.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            }
            if let Some(caps) = p.episode_word.captures(name) {
                mark(caps.get(0).map_or(0, |m| m.start()));
                guess.episodes.extend(caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()));
            }
        }

        if let Some(caps) = p.resolution.captures(name) {
            mark(caps.get(0).map_or(0, |m| m.start()));
            let digits = caps.get(1).map_or("", |m| m.as_str());
            let scan = caps.get(2).map_or("p", |m| m.as_str()).to_lowercase();
            guess.screen_size = Some(format!("{}{}", digits, scan));
        } else if let Some(m) = p.uhd.find(name) {
            mark(m.start());
            guess.screen_size = Some("2160p".to_string());
        }

        if let Some(caps) = p.part.captures(name) {
            mark(caps.get(0).map_or(0, |m| m.start()));
            guess.part = caps.get(1).and_then(|m| m.as_str().parse().ok());
        }

        if let Some(m) = p.technical.find(name) {
            mark(m.start());
        }

        for (re, tag) in &p.tags {
            if let Some(m) = re.find(name) {
                mark(m.start());
                guess.other.push((*tag).to_string());
            }
        }

        // The release year is the last one ahead of the first marker, so a
        // year inside the title ("Blade Runner 2049 2017") stays there. A year
        // at the very start belongs to the title ("1917", "2012 2009").
        let years: Vec<_> = p.year.find_iter(name).filter(|m| m.start() > 0).collect();
        let year = years
            .iter()
            .rev()
            .find(|m| m.start() < title_end)
            .or_else(|| years.first());
        if let Some(m) = year {
            title_end = title_end.min(m.start());
            guess.year = m.as_str().parse().ok();
        }

        guess.title = clean_title(&name[..title_end]);
        Ok(guess)
    }
}

/// Trim dangling separators and brackets, collapse whitespace.
fn clean_title(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim_end_matches(|c: char| c.is_whitespace() || "-([{".contains(c))
        .trim_start_matches(|c: char| c.is_whitespace() || c == '-');
    let title = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Deterministic guesser answering from a fixed table.
///
/// Unknown filenames produce an empty guess; filenames registered with
/// [`StaticGuesser::failing`] produce an error.
#[derive(Debug, Clone, Default)]
pub struct StaticGuesser {
    answers: HashMap<String, Guess>,
    failures: HashSet<String>,
}

impl StaticGuesser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `guess` for `filename`.
    pub fn with(mut self, filename: &str, guess: Guess) -> Self {
        self.answers.insert(filename.to_string(), guess);
        self
    }

    /// Fail for `filename`.
    pub fn failing(mut self, filename: &str) -> Self {
        self.failures.insert(filename.to_string());
        self
    }
}

impl FilenameGuesser for StaticGuesser {
    fn guess(&self, filename: &str) -> Result<Guess> {
        if self.failures.contains(filename) {
            return Err(crate::Error::Guess(filename.to_string()));
        }
        Ok(self.answers.get(filename).cloned().unwrap_or_default())
    }
}
