//! FFmpeg service for downmixing audio.
//!
//! The transcoder is an opaque subprocess: video and subtitle streams are
//! copied verbatim, audio is downmixed to two channels and encoded to FLAC,
//! and the output file is overwritten if present.

use crate::Result;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// Lines of stderr kept in a failure message.
const STDERR_TAIL_LINES: usize = 8;

/// Something that can downmix one file into another.
///
/// Implementations block until the work is done; callers run them on a
/// blocking thread.
pub trait Transcoder: Send + Sync {
    /// Downmix `input` into `output`.
    fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Transcoder backed by the `ffmpeg` command line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    /// Create a transcoder invoking `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program invoked by this transcoder.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Build the ffmpeg argument list for a stereo FLAC downmix.
pub fn downmix_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-nostdin", "-hide_banner", "-loglevel", "error", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_owned());
    args.extend(
        [
            "-map", "0", // keep every stream
            "-c", "copy", // video, subtitles and attachments untouched
            "-c:a", "flac", "-ac", "2", "-y",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

/// Keep the last few lines of a diagnostic stream.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!("{} downmix {:?} -> {:?}", self.program, input, output);

        let output_result = Command::new(&self.program)
            .args(downmix_args(input, output))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| crate::Error::Transcode {
                path: input.to_path_buf(),
                reason: format!("failed to start {}: {}", self.program, e),
            })?;

        if !output_result.status.success() {
            return Err(crate::Error::Transcode {
                path: input.to_path_buf(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output_result.status,
                    stderr_tail(&output_result.stderr)
                ),
            });
        }

        Ok(())
    }
}

/// Check if a program is installed.
pub fn is_installed(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get the program version line.
pub fn get_version(program: &str) -> Result<String> {
    let output = Command::new(program).arg("-version").output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or("unknown");

    Ok(first_line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_args() {
        let args = downmix_args(Path::new("/lib/a.mkv"), Path::new("/lib/a.temp.mkv"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        let input_at = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_at + 1], "/lib/a.mkv");
        assert_eq!(args.last().unwrap(), "/lib/a.temp.mkv");
        assert!(args.windows(2).any(|w| w == ["-c:a", "flac"]));
        assert!(args.windows(2).any(|w| w == ["-ac", "2"]));
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
        assert!(args.contains(&"-y".to_string()));
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = (1..=20).map(|i| format!("line {}\n", i)).collect::<String>();
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("line 13"));
        assert!(tail.ends_with("line 20"));
    }

    #[test]
    fn test_missing_program_is_transcode_error() {
        let transcoder = FfmpegTranscoder::new("definitely-not-a-real-ffmpeg-binary");
        let err = transcoder
            .transcode(Path::new("in.mkv"), Path::new("out.mkv"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Transcode { .. }));
        assert!(!is_installed("definitely-not-a-real-ffmpeg-binary"));
    }
}
