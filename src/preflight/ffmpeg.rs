//! FFmpeg preflight check.

use super::CheckResult;
use crate::services::ffmpeg;

/// Check that the configured ffmpeg program runs.
pub fn check(program: &str) -> CheckResult {
    if ffmpeg::is_installed(program) {
        match ffmpeg::get_version(program) {
            Ok(version) => CheckResult::ok("ffmpeg", &format!("installed ({})", version)),
            Err(_) => CheckResult::ok("ffmpeg", "installed"),
        }
    } else {
        CheckResult::fail(
            "ffmpeg",
            &format!("'{}' not found", program),
            "Install FFmpeg (sudo apt install ffmpeg) or set transcode.program in the config file",
        )
    }
}
