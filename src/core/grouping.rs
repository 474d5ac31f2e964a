//! Grouping of scanned files into movies and series seasons.
//!
//! Grouping is a fold over the scanned files producing an immutable
//! [`Grouping`]. Group membership does not depend on input order; group
//! order and the order of files inside a group follow first appearance,
//! which the planner relies on for version numbering.

use crate::models::media::{ContentType, MediaFile};
use std::collections::{BTreeMap, HashMap};

/// Identity of a movie group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieKey {
    /// Normalized title.
    pub title: String,
    /// Release year.
    pub year: Option<u16>,
}

/// Identity of a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Normalized series name.
    pub name: String,
    /// First air year.
    pub year: Option<u16>,
}

/// Files belonging to one movie.
#[derive(Debug, Clone)]
pub struct MovieGroup {
    pub key: MovieKey,
    pub files: Vec<MediaFile>,
}

/// Files belonging to one series, by season number.
#[derive(Debug, Clone)]
pub struct SeriesGroup {
    pub key: SeriesKey,
    pub seasons: BTreeMap<u32, Vec<MediaFile>>,
}

impl SeriesGroup {
    /// Number of files across all seasons.
    pub fn file_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }
}

/// Result of grouping a scan.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    movies: Vec<MovieGroup>,
    series: Vec<SeriesGroup>,
}

#[derive(Default)]
struct GroupingBuilder {
    movies: Vec<MovieGroup>,
    series: Vec<SeriesGroup>,
    movie_index: HashMap<MovieKey, usize>,
    series_index: HashMap<SeriesKey, usize>,
}

impl GroupingBuilder {
    fn push(mut self, file: &MediaFile) -> Self {
        match file.content_type {
            ContentType::Movie => {
                let key = MovieKey {
                    title: file.title.clone(),
                    year: file.year,
                };
                let idx = *self.movie_index.entry(key.clone()).or_insert_with(|| {
                    self.movies.push(MovieGroup {
                        key,
                        files: Vec::new(),
                    });
                    self.movies.len() - 1
                });
                self.movies[idx].files.push(file.clone());
            }
            ContentType::Series => {
                let key = SeriesKey {
                    name: file.title.clone(),
                    year: file.year,
                };
                let idx = *self.series_index.entry(key.clone()).or_insert_with(|| {
                    self.series.push(SeriesGroup {
                        key,
                        seasons: BTreeMap::new(),
                    });
                    self.series.len() - 1
                });
                self.series[idx]
                    .seasons
                    .entry(file.season_or_default())
                    .or_default()
                    .push(file.clone());
            }
        }
        self
    }

    fn finish(self) -> Grouping {
        Grouping {
            movies: self.movies,
            series: self.series,
        }
    }
}

impl Grouping {
    /// Group scanned files.
    pub fn build(files: &[MediaFile]) -> Self {
        let grouping = files
            .iter()
            .fold(GroupingBuilder::default(), GroupingBuilder::push)
            .finish();

        tracing::info!(
            "Grouped {} files into {} movies and {} series",
            files.len(),
            grouping.movies.len(),
            grouping.series.len()
        );

        grouping
    }

    /// Movie groups in first-appearance order.
    pub fn movies(&self) -> &[MovieGroup] {
        &self.movies
    }

    /// Series groups in first-appearance order.
    pub fn series(&self) -> &[SeriesGroup] {
        &self.series
    }

    /// Total number of grouped files.
    pub fn file_count(&self) -> usize {
        self.movies.iter().map(|g| g.files.len()).sum::<usize>()
            + self.series.iter().map(SeriesGroup::file_count).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.series.is_empty()
    }
}
