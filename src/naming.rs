use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::Result;

/// Timestamp layout used by `rename`, e.g. "2016-11-04 130738"
pub const RENAME_TIME_FORMAT: &str = "%Y-%m-%d %H%M%S";

/// Lowercase extension of a path, without the leading dot
pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// File name of a path with its last extension removed
pub fn base_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derive an output path from an input path.
///
/// The file name is `{base}.{extension}` when `suffix` is empty and
/// `{base}_{suffix}.{extension}` otherwise. Without an output directory the
/// result sits next to the input.
pub fn plan_name<P: AsRef<Path>>(
    input: P,
    suffix: &str,
    extension: &str,
    output_dir: Option<&Path>,
) -> PathBuf {
    let input = input.as_ref();
    let base = base_name(input);

    let file_name = if suffix.is_empty() {
        format!("{}.{}", base, extension)
    } else {
        format!("{}_{}.{}", base, suffix, extension)
    };

    match output_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => input
            .parent()
            .map(|parent| parent.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name)),
    }
}

/// Whether a planned output names the same file as its input
pub fn overwrites_input(input: &Path, output: &Path) -> bool {
    match (std::fs::canonicalize(input), std::fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => input == output,
    }
}

/// Name a file after its modification time, keeping the lowercased extension
pub fn timestamped_name(modified: NaiveDateTime, extension: Option<&str>) -> String {
    let stamp = modified.format(RENAME_TIME_FORMAT).to_string();
    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", stamp, ext),
        _ => stamp,
    }
}

/// Create the output directory and its parents. Calling it again is a no-op.
pub async fn ensure_output_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(dir).await?;
    debug!("Output directory ready: {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_plan_name_next_to_input() {
        assert_eq!(
            plan_name("/a/b/clip.MOV", "", "mp4", None),
            PathBuf::from("/a/b/clip.mp4")
        );
        assert_eq!(
            plan_name("/a/b/clip.MOV", "", "mp4", Some(Path::new(""))),
            PathBuf::from("/a/b/clip.mp4")
        );
    }

    #[test]
    fn test_plan_name_in_output_dir() {
        assert_eq!(
            plan_name("/a/b/clip.MOV", "", "mp4", Some(Path::new("/out"))),
            PathBuf::from("/out/clip.mp4")
        );
    }

    #[test]
    fn test_plan_name_with_suffix() {
        assert_eq!(
            plan_name("/v/beach.mp4", "loop-3", "mp4", None),
            PathBuf::from("/v/beach_loop-3.mp4")
        );
        assert_eq!(
            plan_name("/v/beach.mp4", "length-120", "mp4", Some(Path::new("/out"))),
            PathBuf::from("/out/beach_length-120.mp4")
        );
        assert_eq!(
            plan_name("beach.mp4", "2", "png", None),
            PathBuf::from("beach_2.png")
        );
    }

    #[test]
    fn test_plan_name_without_extension() {
        assert_eq!(
            plan_name("/a/README", "", "wav", None),
            PathBuf::from("/a/README.wav")
        );
        assert_eq!(
            plan_name("/a/archive.tar.gz", "", "mp3", None),
            PathBuf::from("/a/archive.tar.mp3")
        );
    }

    #[test]
    fn test_planned_extension_round_trips() {
        for ext in ["mp4", "wav", "mp3", "png", "jpg"] {
            let planned = plan_name("/in/Some.File.MKV", "x", ext, Some(Path::new("/out")));
            assert_eq!(extension_of(&planned).as_deref(), Some(ext));
        }
    }

    #[test]
    fn test_timestamped_name() {
        let modified = NaiveDate::from_ymd_opt(2016, 11, 4)
            .unwrap()
            .and_hms_opt(13, 7, 38)
            .unwrap();

        assert_eq!(timestamped_name(modified, Some("mp3")), "2016-11-04 130738.mp3");
        assert_eq!(timestamped_name(modified, None), "2016-11-04 130738");
    }

    #[test]
    fn test_overwrites_input() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("a.mp3");
        std::fs::write(&song, b"id3").unwrap();

        assert!(overwrites_input(&song, &plan_name(&song, "", "mp3", None)));
        assert!(overwrites_input(&song, &dir.path().join(".").join("a.mp3")));
        assert!(!overwrites_input(&song, &plan_name(&song, "", "wav", None)));
        assert!(!overwrites_input(&song, &plan_name(&song, "", "mp3", Some(&dir.path().join("out")))));
    }

    #[tokio::test]
    async fn test_ensure_output_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");

        ensure_output_directory(&out).await.unwrap();
        ensure_output_directory(&out).await.unwrap();

        assert!(out.is_dir());
    }
}
