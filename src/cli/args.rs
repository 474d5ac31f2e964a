//! Command line argument definitions.

use crate::models::media::ContentMode;
use clap::Parser;
use std::path::PathBuf;

/// Jellyfin Organizer - Lay out movies and TV shows the way Jellyfin expects
#[derive(Parser, Debug)]
#[command(name = "jellyfin-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the unsorted media
    #[arg(value_name = "SOURCE_DIR", requires = "target")]
    pub source: Option<PathBuf>,

    /// Library root receiving Movies/ and Shows/
    #[arg(value_name = "TARGET_DIR")]
    pub target: Option<PathBuf>,

    /// Treat every file as a movie, as a TV episode, or detect per file
    #[arg(long, value_enum, default_value_t = ContentMode::Auto)]
    pub content_type: ContentMode,

    /// Downmix audio of main files to stereo FLAC after transfer
    #[arg(long)]
    pub downmix_audio: bool,

    /// Prompt for the settings and pick files interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Plan only, do not touch the destination
    #[arg(long)]
    pub dry_run: bool,

    /// Write the plan as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub plan_output: Option<PathBuf>,

    /// Maximum concurrent downmix jobs, 1 or 2 (overrides the config file)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=2))]
    pub max_transcodes: Option<u16>,

    /// Skip preflight checks
    #[arg(long)]
    pub skip_preflight: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// No positionals or `--interactive` starts the prompts.
    pub fn wants_interactive(&self) -> bool {
        self.interactive || self.source.is_none()
    }
}
