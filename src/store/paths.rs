use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

const APP_DIR: &str = "todo";
const DB_FILE: &str = "todo.db";

/// Default store location: `$XDG_CONFIG_HOME/todo/todo.db`, falling back to
/// `$HOME/todo/todo.db`.
pub fn default_db_path() -> Result<PathBuf> {
    default_db_path_from(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn default_db_path_from(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    let base = xdg_config_home
        .filter(|p| !p.as_os_str().is_empty())
        .or(home.filter(|p| !p.as_os_str().is_empty()))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "neither XDG_CONFIG_HOME nor HOME is set; pass --db",
            )
        })?;
    Ok(base.join(APP_DIR).join(DB_FILE))
}

/// Create the directory holding `db_path` if it does not exist yet.
pub fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    let Some(parent) = db_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(parent)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prefers_xdg_config_home() {
        let path = default_db_path_from(Some("/xdg".into()), Some("/home/me".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/todo/todo.db"));
    }

    #[test]
    fn falls_back_to_home_when_xdg_missing_or_empty() {
        let path = default_db_path_from(None, Some("/home/me".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/me/todo/todo.db"));
        let path = default_db_path_from(Some("".into()), Some("/home/me".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/me/todo/todo.db"));
    }

    #[test]
    fn errors_without_any_base_dir() {
        let err = default_db_path_from(None, None).unwrap_err();
        assert_eq!(err.code(), "io_error");
    }

    #[test]
    fn ensure_parent_dir_creates_missing_dirs() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("a").join("b").join("todo.db");
        ensure_parent_dir(&db).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        ensure_parent_dir(&db).unwrap();
    }
}
