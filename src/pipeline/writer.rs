//! Output writing and the collision policy.
//!
//! Every file the crate produces goes through [`prepare_output_path`]: the
//! optional timestamp token is applied to the stem first, then the existence
//! check runs against the final name. Writes are atomic (temp file in the
//! target directory, then persist), so an interrupted run never leaves a
//! half-written HTML file behind.

use crate::config::OutputPolicy;
use crate::error::ResumeError;
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Format of timestamp tokens: `YYYYMMDD_HHMMSS`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The timestamp token for `at`.
pub fn timestamp_token(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `out/cv.html` + `20250101_120000` → `out/cv_20250101_120000.html`.
pub fn with_timestamp(path: &Path, token: &str) -> PathBuf {
    with_stem_suffix(path, token)
}

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(name)
}

/// Apply the policy to `path` and decide whether writing may proceed.
///
/// Returns the final path (timestamped if the policy says so) with its parent
/// directories created.
///
/// # Errors
/// - `AlreadyExists` if the final path exists and `policy.force` is false
/// - `OutputWriteFailed` if the parent directories cannot be created
pub fn prepare_output_path(path: &Path, policy: &OutputPolicy) -> Result<PathBuf, ResumeError> {
    let target = match policy.timestamp.as_deref() {
        Some(token) => with_timestamp(path, token),
        None => path.to_path_buf(),
    };

    if target.exists() {
        if !policy.force {
            return Err(ResumeError::AlreadyExists { path: target });
        }
        debug!("Overwriting existing output {}", target.display());
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ResumeError::OutputWriteFailed {
            path: target.clone(),
            source: e,
        })?;
    }
    Ok(target)
}

/// Write `contents` to `path` under `policy`. Returns the path written.
pub fn write_output(
    path: &Path,
    contents: &[u8],
    policy: &OutputPolicy,
) -> Result<PathBuf, ResumeError> {
    let target = prepare_output_path(path, policy)?;
    write_atomic(&target, contents)?;
    info!("Wrote {} ({} bytes)", target.display(), contents.len());
    Ok(target)
}

/// Temp file next to `path`, then rename over it.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ResumeError> {
    let failed = |source: std::io::Error| ResumeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(contents).map_err(failed)?;
    tmp.flush().map_err(failed)?;
    if let Some(perms) = target_permissions(path) {
        tmp.as_file().set_permissions(perms).map_err(failed)?;
    }
    tmp.persist(path).map_err(|e| failed(e.error))?;
    Ok(())
}

/// Mode for the replacement file: the existing target's, else `0644`.
///
/// Temp files start owner-only; without this every output would be too.
fn target_permissions(path: &Path) -> Option<std::fs::Permissions> {
    if let Ok(meta) = std::fs::metadata(path) {
        return Some(meta.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// First free path among `path`, `stem_1.ext`, `stem_2.ext`, …
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    (1u32..)
        .map(|n| with_stem_suffix(path, &n.to_string()))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn token_format() {
        assert_eq!(timestamp_token(at(7, 5, 3)), "20250309_070503");
    }

    #[test]
    fn timestamp_goes_before_extension() {
        assert_eq!(
            with_timestamp(Path::new("out/cv.html"), "20250309_070503"),
            PathBuf::from("out/cv_20250309_070503.html")
        );
        assert_eq!(
            with_timestamp(Path::new("cv"), "20250309_070503"),
            PathBuf::from("cv_20250309_070503")
        );
    }

    #[test]
    fn existing_target_without_force_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cv.html");
        fs::write(&path, "old").unwrap();

        let err = write_output(&path, b"new", &OutputPolicy::new(false)).unwrap_err();
        assert!(matches!(err, ResumeError::AlreadyExists { .. }));
        assert!(err.to_string().contains("cv.html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn force_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cv.html");
        fs::write(&path, "old").unwrap();

        let written = write_output(&path, b"new", &OutputPolicy::new(true)).unwrap();
        assert_eq!(written, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/cv.html");
        write_output(&path, b"x", &OutputPolicy::default()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn distinct_timestamps_give_distinct_files() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("cv.html");

        let first = OutputPolicy::new(false).with_timestamp(timestamp_token(at(10, 0, 0)));
        let second = OutputPolicy::new(false).with_timestamp(timestamp_token(at(10, 0, 1)));
        let a = write_output(&base, b"1", &first).unwrap();
        let b = write_output(&base, b"2", &second).unwrap();

        assert_ne!(a, b);
        assert_eq!(fs::read_to_string(a).unwrap(), "1");
        assert_eq!(fs::read_to_string(b).unwrap(), "2");
        assert!(!base.exists());
    }

    #[test]
    fn same_timestamp_twice_collides() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("cv.html");
        let policy = OutputPolicy::new(false).with_timestamp("20250309_070503");
        write_output(&base, b"1", &policy).unwrap();
        assert!(matches!(
            write_output(&base, b"2", &policy),
            Err(ResumeError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn unique_path_appends_counter() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("cv_proofread.yaml");
        assert_eq!(unique_path(&base), base);

        fs::write(&base, "").unwrap();
        assert_eq!(unique_path(&base), dir.path().join("cv_proofread_1.yaml"));

        fs::write(dir.path().join("cv_proofread_1.yaml"), "").unwrap();
        assert_eq!(unique_path(&base), dir.path().join("cv_proofread_2.yaml"));
    }

    #[cfg(unix)]
    #[test]
    fn new_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let out = write_output(&dir.path().join("cv.html"), b"<html>", &OutputPolicy::default())
            .unwrap();
        assert_eq!(fs::metadata(out).unwrap().permissions().mode() & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn forced_overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cv.html");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();

        write_output(&path, b"new", &OutputPolicy::new(true)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o664);
    }
}
