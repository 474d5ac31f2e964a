//! Interactive entry point.
//!
//! Prompts for the run settings, lets the user pick which scanned video
//! files to organize, and hands back a [`RunConfig`] for the pipeline.

use crate::core::scanner::list_video_files;
use crate::models::config::RunConfig;
use crate::models::media::ContentMode;
use crate::Result;
use colored::Colorize;
use dialoguer::console::Term;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::path::{Path, PathBuf};

const CONTENT_CHOICES: [(ContentMode, &str); 3] = [
    (ContentMode::Auto, "Auto-detect per file"),
    (ContentMode::Movies, "Everything is a movie"),
    (ContentMode::Tv, "Everything is a TV episode"),
];

/// Defaults shown in the prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptDefaults {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub content_mode: ContentMode,
    pub downmix_audio: bool,
    pub dry_run: bool,
}

fn prompt_directory(prompt: &str, default: Option<&Path>, must_exist: bool) -> Result<PathBuf> {
    let term = Term::stderr();
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.display().to_string());
    }

    let answer = input
        .validate_with(move |value: &String| -> std::result::Result<(), String> {
            let path = Path::new(value.trim());
            if value.trim().is_empty() {
                Err("a path is required".to_string())
            } else if must_exist && !path.is_dir() {
                Err(format!("{} is not a directory", path.display()))
            } else {
                Ok(())
            }
        })
        .interact_text_on(&term)?;

    Ok(PathBuf::from(answer.trim()))
}

/// Label for a file in the selection list, relative to the source.
fn selection_label(source: &Path, path: &Path) -> String {
    path.strip_prefix(source)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Ask for the run settings and the file selection.
///
/// Returns `None` when there is nothing to do or the user backs out.
pub fn prompt_run(defaults: &PromptDefaults) -> Result<Option<RunConfig>> {
    let term = Term::stderr();

    println!("{}", "Jellyfin Organizer".bold().cyan());
    println!();

    let source = prompt_directory("Source directory", defaults.source.as_deref(), true)?;
    let target = prompt_directory("Target library directory", defaults.target.as_deref(), false)?;

    let labels: Vec<&str> = CONTENT_CHOICES.iter().map(|(_, label)| *label).collect();
    let default_choice = CONTENT_CHOICES
        .iter()
        .position(|(mode, _)| *mode == defaults.content_mode)
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("Content type")
        .items(&labels)
        .default(default_choice)
        .interact_on(&term)?;
    let content_mode = CONTENT_CHOICES[choice].0;

    let downmix_audio = Confirm::new()
        .with_prompt("Downmix audio to stereo FLAC after copying?")
        .default(defaults.downmix_audio)
        .interact_on(&term)?;

    let (videos, _, _) = list_video_files(&source)?;
    if videos.is_empty() {
        println!("{}", "No video files found.".yellow());
        return Ok(None);
    }

    let items: Vec<String> = videos.iter().map(|p| selection_label(&source, p)).collect();
    let checked = vec![true; items.len()];
    let picked = MultiSelect::new()
        .with_prompt("Files to organize (space toggles, enter confirms)")
        .items(&items)
        .defaults(&checked)
        .interact_on(&term)?;

    if picked.is_empty() {
        println!("{}", "Nothing selected.".yellow());
        return Ok(None);
    }

    let proceed = Confirm::new()
        .with_prompt(format!(
            "Organize {} of {} files into {}?",
            picked.len(),
            videos.len(),
            target.display()
        ))
        .default(true)
        .interact_on(&term)?;
    if !proceed {
        return Ok(None);
    }

    let selected_files = if picked.len() == videos.len() {
        None
    } else {
        Some(picked.into_iter().map(|i| videos[i].clone()).collect())
    };

    Ok(Some(RunConfig {
        source,
        target,
        content_mode,
        downmix_audio,
        selected_files,
        dry_run: defaults.dry_run,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_label() {
        assert_eq!(
            selection_label(Path::new("/in"), Path::new("/in/Show/S01E01.mkv")),
            format!("Show{}S01E01.mkv", std::path::MAIN_SEPARATOR)
        );
        assert_eq!(
            selection_label(Path::new("/other"), Path::new("/in/a.mkv")),
            "/in/a.mkv"
        );
    }

    #[test]
    fn test_content_choices_cover_all_modes() {
        for mode in [ContentMode::Auto, ContentMode::Movies, ContentMode::Tv] {
            assert!(CONTENT_CHOICES.iter().any(|(m, _)| *m == mode));
        }
    }
}
