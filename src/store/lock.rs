use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, TodoError};

/// Lock file guarding a database file: `<db>.lock` next to it.
pub fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Acquire an exclusive lock on a file without waiting, returning the locked
/// File handle. The lock is released when the File is dropped.
pub fn acquire_lock(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    file.try_lock_exclusive()
        .map_err(|_| TodoError::Locked(path.display().to_string()))?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_acquire_fails_until_first_is_dropped() {
        let dir = tempdir().unwrap();
        let lock_path = dir.path().join("todo.db.lock");

        let file = acquire_lock(&lock_path).unwrap();
        let err = acquire_lock(&lock_path).unwrap_err();
        assert_eq!(err.code(), "locked");

        drop(file);
        let _file = acquire_lock(&lock_path).unwrap();
    }

    #[test]
    fn lock_path_appends_suffix() {
        let p = lock_path_for(Path::new("/tmp/todo/todo.db"));
        assert_eq!(p, PathBuf::from("/tmp/todo/todo.db.lock"));
    }
}
