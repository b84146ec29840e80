use crate::db;
use crate::error::{Result, StoreError};
use crate::paths;
use rusqlite::backup::Backup;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const STEP_PAGES: i32 = 200;
const STEP_PAUSE: Duration = Duration::from_millis(25);

/// Writes an online snapshot of the live database to `path`.
///
/// The target must not alias the live database file, its `-wal`/`-shm`
/// sidecars, or the same inode through a hard link; those all fail with
/// `InvalidBackupPath` before anything is written.
pub fn backup_to(conn: &Connection, path: &Path) -> Result<()> {
    paths::ensure_parent_dir(path)?;
    let target = absolute_target(path)?;
    reject_live_aliases(conn, &target, path)?;

    let mut dest = Connection::open(&target)?;
    let backup = Backup::new(conn, &mut dest)?;
    backup.run_to_completion(STEP_PAGES, STEP_PAUSE, None)?;

    // Same file mode as the live database; the snapshot holds the same data.
    db::tighten_file_mode(&target)?;
    Ok(())
}

fn reject_live_aliases(conn: &Connection, target: &Path, original: &Path) -> Result<()> {
    let Some(live) = live_db_path(conn)? else {
        return Ok(());
    };
    let live = absolute_target(&live)?;

    let aliased = target == live.as_path()
        || is_wal_sidecar(target, &live)
        || same_inode(target, &live)?;
    if aliased {
        return Err(StoreError::InvalidBackupPath(original.to_path_buf()));
    }
    Ok(())
}

/// Absolute form of `path` even when the file does not exist yet; the parent
/// directory must exist (ensured above).
fn absolute_target(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(fs::canonicalize(path)?);
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::InvalidBackupPath(path.to_path_buf()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(file_name))
}

fn live_db_path(conn: &Connection) -> Result<Option<PathBuf>> {
    let mut stmt = conn.prepare("PRAGMA database_list;")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name != "main" {
            continue;
        }
        let file: String = row.get(2)?;
        if !file.is_empty() {
            return Ok(Some(PathBuf::from(file)));
        }
    }
    Ok(None)
}

fn is_wal_sidecar(target: &Path, live: &Path) -> bool {
    ["-wal", "-shm"].iter().any(|suffix| {
        let mut sidecar = live.as_os_str().to_owned();
        sidecar.push(suffix);
        target == Path::new(&sidecar)
    })
}

#[cfg(unix)]
fn same_inode(target: &Path, live: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;
    if !target.exists() || !live.exists() {
        return Ok(false);
    }
    let target_meta = fs::metadata(target)?;
    let live_meta = fs::metadata(live)?;
    Ok(target_meta.dev() == live_meta.dev() && target_meta.ino() == live_meta.ino())
}

#[cfg(not(unix))]
fn same_inode(_target: &Path, _live: &Path) -> Result<bool> {
    Ok(false)
}
