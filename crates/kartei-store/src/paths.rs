use crate::error::{Result, StoreError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DIR_NAME: &str = "kartei";
const DB_FILE: &str = "kartei.sqlite3";

/// `$XDG_DATA_HOME/kartei`, falling back to `~/.local/share/kartei`.
pub fn data_dir() -> Result<PathBuf> {
    match env::var_os("XDG_DATA_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir).join(DIR_NAME)),
        Some(dir) => Err(StoreError::InvalidDataPath(PathBuf::from(dir))),
        None => {
            let home = dirs::home_dir().ok_or(StoreError::MissingHomeDir)?;
            Ok(home.join(".local").join("share").join(DIR_NAME))
        }
    }
}

pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = data_dir()?;
    fs::create_dir_all(&dir)?;
    tighten_dir_mode(&dir)?;
    Ok(dir)
}

pub fn db_path() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join(DB_FILE))
}

/// Timestamped file next to the live database.
pub fn backup_path() -> Result<PathBuf> {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    Ok(ensure_data_dir()?.join(format!("kartei-backup-{stamp}.sqlite3")))
}

/// Explicit paths win over the XDG default location.
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    let Some(path) = custom else {
        return db_path();
    };
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidDataPath(path));
    }
    ensure_parent_dir(&path)?;
    Ok(path)
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

// Owner-only, same as the database file itself.
#[cfg(unix)]
fn tighten_dir_mode(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn tighten_dir_mode(_dir: &Path) -> Result<()> {
    Ok(())
}
