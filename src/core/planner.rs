//! Path planner module.
//!
//! Turns a [`Grouping`] into a [`Plan`]: one target path and one transfer
//! operation per scanned file, laid out the way Jellyfin expects.
//!
//! ```text
//! Movies/{Title} ({Year})/{Title} ({Year}) - {res} - part{N} - version{k}.{ext}
//! Movies/{Title} ({Year})/{category}/{original filename}
//! Shows/{Series} ({Year})/Season {NN}/{Series} S{NN}E{ep} Part {N} - {res}.{ext}
//! Shows/{Series} ({Year})/Season {NN}/{category}/{original filename}
//! ```

use crate::core::grouping::{Grouping, MovieGroup, SeriesGroup};
use crate::generators::filename::{generate_episode_filename, generate_movie_filename};
use crate::generators::folder::{
    generate_movie_folder, generate_season_folder, generate_series_folder, MOVIES_DIR, SHOWS_DIR,
};
use crate::models::media::MediaFile;
use crate::models::plan::{FileOperation, Plan, PlanFailure, TargetPlanEntry};
use crate::utils::fs::{create_dir_all, with_stem_suffix};
use crate::Result;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Planner options.
#[derive(Debug, Clone, Copy)]
pub struct PlannerOptions {
    /// Main files get their audio downmixed after transfer.
    pub downmix_audio: bool,
    /// Create group folders while planning. Off for dry runs.
    pub create_folders: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            downmix_audio: false,
            create_folders: true,
        }
    }
}

/// Path planner.
#[derive(Debug, Clone, Default)]
pub struct PathPlanner {
    options: PlannerOptions,
}

/// Mutable state while one plan is being built.
struct PlanState {
    entries: Vec<TargetPlanEntry>,
    failures: Vec<PlanFailure>,
    claimed: HashSet<PathBuf>,
}

impl PlanState {
    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.exists()
    }

    /// Claim `candidate`, or the first free `{stem}_{n}{ext}` variant.
    fn claim(&mut self, candidate: PathBuf) -> PathBuf {
        let mut path = candidate.clone();
        let mut counter = 1;
        while self.is_taken(&path) {
            path = with_stem_suffix(&candidate, &format!("_{}", counter));
            counter += 1;
        }
        if path != candidate {
            tracing::debug!("Target {:?} taken, using {:?}", candidate, path);
        }
        self.claimed.insert(path.clone());
        path
    }

    fn push(
        &mut self,
        source: &MediaFile,
        target: PathBuf,
        operation: FileOperation,
        needs_transcode: bool,
    ) {
        tracing::debug!("Plan: {} {:?} -> {:?}", operation, source.path, target);
        self.entries.push(TargetPlanEntry {
            source: source.clone(),
            target,
            operation,
            is_extra: source.is_extra(),
            needs_transcode: needs_transcode && !source.is_extra(),
        });
    }
}

impl PathPlanner {
    /// Create a new planner.
    pub fn new(options: PlannerOptions) -> Self {
        Self { options }
    }

    /// Planner options in use.
    pub fn options(&self) -> PlannerOptions {
        self.options
    }

    /// Build the plan for a grouping.
    ///
    /// Groups whose folder cannot be created are recorded in
    /// [`Plan::failures`]; planning continues with the other groups.
    pub fn plan(&self, grouping: &Grouping, source: &Path, target: &Path) -> Plan {
        let mut state = PlanState {
            entries: Vec::with_capacity(grouping.file_count()),
            failures: Vec::new(),
            claimed: HashSet::new(),
        };

        let movies_root = target.join(MOVIES_DIR);
        for group in grouping.movies() {
            self.plan_movie(group, &movies_root, &mut state);
        }

        let shows_root = target.join(SHOWS_DIR);
        for group in grouping.series() {
            self.plan_series(group, &shows_root, &mut state);
        }

        tracing::info!(
            "Planned {} files ({} folder failures)",
            state.entries.len(),
            state.failures.len()
        );

        Plan {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
            source_path: source.to_path_buf(),
            target_path: target.to_path_buf(),
            entries: state.entries,
            failures: state.failures,
        }
    }

    /// Create a group folder, recording a failure for its files.
    fn prepare_folder(&self, folder: &Path, files: &[MediaFile], state: &mut PlanState) -> bool {
        if !self.options.create_folders {
            return true;
        }
        match create_dir_all(folder) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("{}", e);
                state.failures.push(PlanFailure {
                    folder: folder.to_path_buf(),
                    reason: e.to_string(),
                    sources: files.iter().map(|f| f.path.clone()).collect(),
                });
                false
            }
        }
    }

    fn plan_movie(&self, group: &MovieGroup, movies_root: &Path, state: &mut PlanState) {
        let folder_name = generate_movie_folder(&group.key.title, group.key.year);
        let folder = movies_root.join(&folder_name);

        if !self.prepare_folder(&folder, &group.files, state) {
            return;
        }

        let (extras, mains): (Vec<&MediaFile>, Vec<&MediaFile>) =
            group.files.iter().partition(|f| f.is_extra());

        let mut versions: HashMap<(Option<&str>, Option<u32>), usize> = HashMap::new();
        for file in mains {
            let resolution = file.resolution.as_deref();
            let count = versions.entry((resolution, file.part)).or_insert(0);
            *count += 1;
            let version = (*count > 1).then_some(*count);

            let name = generate_movie_filename(
                &folder_name,
                resolution,
                file.part,
                version,
                &file.extension,
            );
            let target = state.claim(folder.join(name));
            state.push(file, target, FileOperation::Copy, self.options.downmix_audio);
        }

        for file in extras {
            let target = state.claim(extra_target(&folder, file));
            state.push(file, target, FileOperation::Copy, false);
        }
    }

    fn plan_series(&self, group: &SeriesGroup, shows_root: &Path, state: &mut PlanState) {
        let series_folder =
            shows_root.join(generate_series_folder(&group.key.name, group.key.year));
        let main_operation = if self.options.downmix_audio {
            FileOperation::Copy
        } else {
            FileOperation::Move
        };

        for (&season, files) in &group.seasons {
            let folder = series_folder.join(generate_season_folder(season));

            if !self.prepare_folder(&folder, files, state) {
                continue;
            }

            for file in files.iter().filter(|f| !f.is_extra()) {
                let name = generate_episode_filename(
                    &group.key.name,
                    season,
                    file.episode.as_ref(),
                    file.part,
                    file.resolution.as_deref(),
                    &file.extension,
                );
                let target = state.claim(folder.join(name));
                state.push(file, target, main_operation, self.options.downmix_audio);
            }

            for file in files.iter().filter(|f| f.is_extra()) {
                let target = state.claim(extra_target(&folder, file));
                state.push(file, target, FileOperation::Move, false);
            }
        }
    }
}

/// Extras keep their original filename inside the category folder.
fn extra_target(folder: &Path, file: &MediaFile) -> PathBuf {
    match file.extra {
        Some(category) => folder.join(category.folder_name()).join(&file.filename),
        None => folder.join(&file.filename),
    }
}

/// Make sure no two entries write to the same target.
pub fn validate_no_duplicate_targets(plan: &Plan) -> Result<()> {
    let mut target_to_sources: HashMap<&Path, Vec<&Path>> = HashMap::new();

    for entry in &plan.entries {
        target_to_sources
            .entry(entry.target.as_path())
            .or_default()
            .push(entry.source.path.as_path());
    }

    let duplicates: Vec<_> = target_to_sources
        .iter()
        .filter(|(_, sources)| sources.len() > 1)
        .collect();

    if duplicates.is_empty() {
        return Ok(());
    }

    let mut error_msg = String::from("Duplicate target paths detected:\n");
    for (target, sources) in duplicates {
        error_msg.push_str(&format!("Target: {:?}\n", target));
        for src in sources {
            error_msg.push_str(&format!("    - {:?}\n", src));
        }
    }
    Err(crate::Error::other(error_msg))
}

/// Save a plan to a JSON file.
pub fn save_plan(plan: &Plan, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(json.as_bytes())?;

    tracing::info!("Plan saved to {:?}", path);
    Ok(())
}

/// Load a plan from a JSON file.
pub fn load_plan(path: &Path) -> Result<Plan> {
    let content = fs::read_to_string(path)?;
    let plan: Plan = serde_json::from_str(&content)?;
    Ok(plan)
}
