//! Owner-only files under the CLI base path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::CliError;

fn storage_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::Storage {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `dir` (and parents) if missing; a directory created here is
/// restricted to the owner. Existing directories keep their mode.
pub fn ensure_private_dir(dir: &Path) -> Result<(), CliError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(0o700)) {
            tracing::warn!("failed to chmod 0700 {}: {e}", dir.display());
        }
    }
    Ok(())
}

/// Fully written, owner-only temporary file in `dir`.
fn stage(dir: &Path, contents: &[u8]) -> Result<NamedTempFile, CliError> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| storage_error(dir, e))?;
    tmp.write_all(contents).map_err(|e| storage_error(tmp.path(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| storage_error(tmp.path(), e))?;
    }
    tmp.as_file().sync_all().map_err(|e| storage_error(tmp.path(), e))?;
    Ok(tmp)
}

/// Replace each `(name, contents)` file under `dir` with mode 0600.
///
/// Every file is fully written to a temporary sibling before any of them is
/// renamed into place. If a rename fails, the files already replaced get
/// their previous contents back (or are removed if they did not exist).
pub fn write_private_files(dir: &Path, files: &[(&str, &[u8])]) -> Result<(), CliError> {
    ensure_private_dir(dir)?;

    let mut staged = Vec::with_capacity(files.len());
    for (name, contents) in files {
        staged.push((dir.join(name), stage(dir, contents)?));
    }

    let mut replaced: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
    for (target, tmp) in staged {
        let previous = fs::read(&target).ok();
        if let Err(e) = tmp.persist(&target) {
            restore(dir, replaced);
            return Err(storage_error(&target, e.error));
        }
        replaced.push((target, previous));
    }
    Ok(())
}

fn restore(dir: &Path, replaced: Vec<(PathBuf, Option<Vec<u8>>)>) {
    for (target, previous) in replaced {
        let outcome = match previous {
            Some(contents) => stage(dir, &contents).and_then(|tmp| {
                tmp.persist(&target)
                    .map(drop)
                    .map_err(|e| storage_error(&target, e.error))
            }),
            None => fs::remove_file(&target).map_err(|e| storage_error(&target, e)),
        };
        if let Err(e) = outcome {
            tracing::warn!("failed to restore {}: {e}", target.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let dir = tmp.path().join("a").join("b");

        write_private_files(&dir, &[("one", b"1".as_slice()), ("two", b"2".as_slice())]).expect("write");

        assert_eq!(fs::read_to_string(dir.join("one")).unwrap(), "1");
        assert_eq!(fs::read_to_string(dir.join("two")).unwrap(), "2");
        // Only the targets remain; staged files were renamed.
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn files_and_directory_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let dir = tmp.path().join("private");
        write_private_files(&dir, &[("secret", b"s3cr3t".as_slice())]).expect("write");

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dir), 0o700);
        assert_eq!(mode(&dir.join("secret")), 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_directory_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let dir = tmp.path().join("shared");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        write_private_files(&dir, &[("secret", b"s3cr3t".as_slice())]).expect("write");

        assert_eq!(fs::metadata(&dir).unwrap().permissions().mode() & 0o777, 0o755);
        assert_eq!(fs::metadata(dir.join("secret")).unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn failed_rename_restores_files_already_replaced() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let dir = tmp.path();
        fs::write(dir.join("one"), "old").unwrap();
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(dir.join("two")).unwrap();
        fs::write(dir.join("two").join("keep"), "x").unwrap();

        let err = write_private_files(dir, &[("one", b"new".as_slice()), ("two", b"2".as_slice())]).unwrap_err();

        assert!(matches!(err, CliError::Storage { .. }));
        assert_eq!(fs::read_to_string(dir.join("one")).unwrap(), "old");
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn failed_rename_removes_files_that_did_not_exist() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let dir = tmp.path();
        fs::create_dir(dir.join("two")).unwrap();
        fs::write(dir.join("two").join("keep"), "x").unwrap();

        assert!(write_private_files(dir, &[("one", b"new".as_slice()), ("two", b"2".as_slice())]).is_err());
        assert!(!dir.join("one").exists());
    }
}
