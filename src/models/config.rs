//! Configuration model.

use super::media::ContentMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the transcoder program.
pub const FFMPEG_ENV: &str = "JELLYFIN_ORGANIZER_FFMPEG";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Transcoder configuration.
    pub transcode: TranscodeConfig,
    /// File transfer configuration.
    pub transfer: TransferConfig,
}

/// Transcoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Program to invoke.
    pub program: String,
    /// Maximum transcodes running at once, capped at 2 by the coordinator.
    pub max_concurrent: usize,
}

/// File transfer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Verify checksums when a move has to fall back to copy + delete.
    pub verify_checksum: bool,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            program: std::env::var(FFMPEG_ENV).unwrap_or_else(|_| "ffmpeg".to_string()),
            max_concurrent: 2,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

/// Settings for one pipeline run, as supplied by the CLI or the interactive
/// entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory to scan.
    pub source: PathBuf,
    /// Library root receiving `Movies/` and `Shows/`.
    pub target: PathBuf,
    /// Forced or auto-detected content type.
    pub content_mode: ContentMode,
    /// Downmix audio of main files to stereo after transfer.
    pub downmix_audio: bool,
    /// Restrict the run to these source files; `None` means everything scanned.
    pub selected_files: Option<Vec<PathBuf>>,
    /// Plan only, do not touch the destination.
    pub dry_run: bool,
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jellyfin_organizer")
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> crate::Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from file, falling back to defaults.
pub fn load_config() -> AppConfig {
    let config_path = config_file_path();

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match parse_config(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Ignoring config {:?}: {}", config_path, e),
            },
            Err(e) => tracing::warn!("Cannot read config {:?}: {}", config_path, e),
        }
    }

    AppConfig::default()
}
