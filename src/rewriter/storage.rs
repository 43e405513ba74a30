//! Whole-file reads and atomic writes
//!
//! A save never truncates the target in place: content goes to a temp file in the
//! same directory, is flushed and synced, then renamed over the target. If any step
//! fails the temp file is dropped (and deleted) and the original stays as it was.

use crate::domain::{Document, RewriteError, RewriteResult};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Read the entire file as UTF-8 text
pub fn load<P: AsRef<Path>>(path: P) -> RewriteResult<Document> {
    let path = path.as_ref();

    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RewriteError::not_found(path),
        _ => RewriteError::read(path, e),
    })?;

    tracing::debug!("Loaded {} ({} bytes)", path.display(), text.len());
    Ok(Document::new(path, text))
}

/// Replace the file at `path` with the document's text.
///
/// Symlinks are followed: the file they point to is replaced and the link stays.
/// A read-only target is refused with a `Write` error.
pub fn save<P: AsRef<Path>>(document: &Document, path: P) -> RewriteResult<()> {
    let path = path.as_ref();

    let resolved = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(RewriteError::write(path, e)),
    };

    let permissions = match fs::metadata(&resolved) {
        Ok(metadata) if metadata.permissions().readonly() => {
            return Err(RewriteError::write(
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => None,
    };

    let dir = match resolved.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| RewriteError::write(path, e))?;

    temp.write_all(document.text().as_bytes()).map_err(|e| RewriteError::write(path, e))?;
    temp.flush().map_err(|e| RewriteError::write(path, e))?;
    temp.as_file().sync_all().map_err(|e| RewriteError::write(path, e))?;

    // The temp file is created 0600; keep the target's permissions
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| RewriteError::write(path, e))?;
    }

    temp.persist(&resolved).map_err(|e| RewriteError::write(path, e.error))?;

    tracing::debug!("Saved {} ({} bytes)", path.display(), document.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_reads_whole_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Index.tsx");
        fs::write(&path, "line one\nline two\n").unwrap();

        let document = load(&path).unwrap();
        assert_eq!(document.text(), "line one\nline two\n");
        assert_eq!(document.path(), path.as_path());
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = load(temp_dir.path().join("missing.tsx")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_invalid_utf8_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("binary.tsx");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, RewriteError::Read { .. }));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, RewriteError::Read { .. }));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Index.tsx");
        fs::write(&path, "old content that is longer than the new one").unwrap();

        save(&Document::new(&path, "new"), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("Index.tsx");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep.txt"), "untouched").unwrap();

        let err = save(&Document::new(&blocker, "replacement"), &blocker).unwrap_err();

        assert!(matches!(err, RewriteError::Write { .. }));
        assert!(blocker.is_dir());
        assert_eq!(fs::read_to_string(blocker.join("keep.txt")).unwrap(), "untouched");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no/such/dir/Index.tsx");

        let err = save(&Document::new(&path, "x"), &path).unwrap_err();
        assert!(matches!(err, RewriteError::Write { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Index.tsx");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save(&Document::new(&path, "new"), &path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_through_symlink_updates_link_target() {
        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real.tsx");
        let link = temp_dir.path().join("Index.tsx");
        fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        save(&Document::new(&link, "new"), &link).unwrap();

        assert_eq!(fs::read_to_string(&real).unwrap(), "new");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&link).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_save_read_only_file_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Index.tsx");
        fs::write(&path, "old").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let err = save(&Document::new(&path, "new"), &path).unwrap_err();

        assert!(matches!(err, RewriteError::Write { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
