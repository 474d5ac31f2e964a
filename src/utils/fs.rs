//! File system utilities.

use crate::Result;
use std::path::{Path, PathBuf};

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Create a directory and all parent directories.
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| crate::Error::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Split a file name into stem and extension (with dot) at the last dot.
fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

/// Same directory and extension, stem with `suffix` appended.
///
/// `Show S01E01.mkv` + `_1` gives `Show S01E01_1.mkv`.
pub fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let (stem, ext) = split_name(path);
    path.with_file_name(format!("{}{}{}", stem, suffix, ext))
}

/// Temporary output path used while transcoding `target`.
///
/// `Show S01E01.mkv` gives `Show S01E01.temp.mkv`.
pub fn temp_path_for(target: &Path) -> PathBuf {
    with_stem_suffix(target, ".temp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_stem_suffix() {
        assert_eq!(
            with_stem_suffix(Path::new("/lib/Avatar (2009) - 1080p.mkv"), "_2"),
            PathBuf::from("/lib/Avatar (2009) - 1080p_2.mkv")
        );
        assert_eq!(
            with_stem_suffix(Path::new("/lib/noext"), "_1"),
            PathBuf::from("/lib/noext_1")
        );
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/lib/Show S01E01.mkv")),
            PathBuf::from("/lib/Show S01E01.temp.mkv")
        );
    }

    #[test]
    fn test_create_dir_all_reports_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = create_dir_all(&blocker.join("sub")).unwrap_err();
        assert!(matches!(err, crate::Error::DirectoryCreate { .. }));
    }

    #[test]
    fn test_ensure_directory() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_directory(dir.path()).is_ok());
        assert!(matches!(
            ensure_directory(&dir.path().join("missing")),
            Err(crate::Error::PathNotFound(_))
        ));
    }
}
