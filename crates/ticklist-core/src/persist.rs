//! Crash-safe storage I/O for the store file.
//!
//! Saves write a sibling `<name>.tmp`, fsync it, and rename it over the
//! target, so a reader only ever sees the old file or the new one. Saves hold
//! an exclusive advisory lock on `<name>.lock`; loads hold a shared one.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::codec;
use crate::error::PersistenceError;
use crate::lock::{LockError, StoreReadLock, StoreWriteLock, lock_path_for};
use crate::model::item::TodoItem;

/// Temporary file a save writes before renaming it over `target`.
#[must_use]
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map_or_else(|| OsString::from("store"), ToOwned::to_owned);
    name.push(".tmp");
    target.with_file_name(name)
}

/// Removes the temp file on drop unless the rename went through.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    const fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Replace `target` with `bytes` atomically.
///
/// The parent directory must already exist.
///
/// # Errors
///
/// Returns [`PersistenceError::Write`] if creating, writing, syncing, or
/// renaming fails. The temp file is removed on every failure path.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let tmp = temp_path_for(target);
    let write_err = |source| PersistenceError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut guard = TempFileGuard::new(tmp.clone());
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)
        .map_err(write_err)?;
    file.write_all(bytes).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&tmp, target).map_err(write_err)?;
    guard.disarm();
    sync_parent_dir(target);

    debug!(path = %target.display(), bytes = bytes.len(), "store file replaced");
    Ok(())
}

/// Best effort: make the rename itself durable. Not all platforms allow
/// opening a directory, so failures are ignored.
fn sync_parent_dir(target: &Path) {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

fn parent_dir_exists(path: &Path) -> bool {
    path.parent()
        .is_none_or(|p| p.as_os_str().is_empty() || p.is_dir())
}

/// Read `path`, mapping "not found" to `Ok(None)`.
///
/// # Errors
///
/// Returns [`PersistenceError::Read`] for any I/O error other than `NotFound`.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, PersistenceError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Encode and atomically write `items` to `path` under the write lock.
///
/// # Errors
///
/// Returns a [`PersistenceError`] if the lock, encoding, or write fails.
pub fn save_items(
    path: &Path,
    items: &[TodoItem],
    lock_timeout: Duration,
) -> Result<(), PersistenceError> {
    if !parent_dir_exists(path) {
        return Err(PersistenceError::Write {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist"),
        });
    }

    let bytes = codec::encode(items, Utc::now())?;
    let lock = StoreWriteLock::acquire(&lock_path_for(path), lock_timeout)?;
    write_atomic(path, &bytes)?;
    lock.release();

    info!(path = %path.display(), items = items.len(), "saved todo list");
    Ok(())
}

/// Read and decode the items stored at `path` under the read lock.
///
/// A missing file yields an empty list. A missing parent directory counts as
/// a missing file. Loads never create the lock file; without one they read
/// unlocked.
///
/// # Errors
///
/// Returns a [`PersistenceError`] if the file exists but cannot be read or
/// decoded, or if a writer holds the lock past `lock_timeout`.
pub fn load_items(path: &Path, lock_timeout: Duration) -> Result<Vec<TodoItem>, PersistenceError> {
    if !parent_dir_exists(path) {
        info!(path = %path.display(), "store directory missing, starting empty");
        return Ok(Vec::new());
    }

    let lock = StoreReadLock::acquire(&lock_path_for(path), lock_timeout).map_err(|err| match err {
        LockError::IoError { source, .. } => PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        },
        timeout @ LockError::Timeout { .. } => PersistenceError::Lock(timeout),
    })?;
    let bytes = read_optional(path)?;
    if let Some(lock) = lock {
        lock.release();
    }

    let Some(bytes) = bytes else {
        info!(path = %path.display(), "store file missing, starting empty");
        return Ok(Vec::new());
    };

    let items = codec::decode(&bytes, path)?;
    info!(path = %path.display(), items = items.len(), "loaded todo list");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::DEFAULT_LOCK_TIMEOUT;

    #[test]
    fn temp_path_sits_next_to_target() {
        assert_eq!(
            temp_path_for(Path::new("/data/todos.json")),
            PathBuf::from("/data/todos.json.tmp")
        );
    }

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("todos.json");
        fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!temp_path_for(&target).exists());
    }

    #[test]
    fn write_atomic_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nope").join("todos.json");

        let err = write_atomic(&target, b"data").unwrap_err();

        assert!(matches!(err, PersistenceError::Write { .. }));
        assert!(!target.exists());
        assert!(!temp_path_for(&target).exists());
    }

    #[test]
    fn failed_rename_removes_temp_and_keeps_old_target() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        let target = dir.path().join("todos.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        let err = write_atomic(&target, b"data").unwrap_err();

        assert!(matches!(err, PersistenceError::Write { .. }));
        assert!(target.join("keep").exists());
        assert!(!temp_path_for(&target).exists());
    }

    #[test]
    fn read_optional_maps_not_found_to_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("todos.json");
        let items = vec![TodoItem::with_completed("a", true), TodoItem::new("b")];

        save_items(&target, &items, DEFAULT_LOCK_TIMEOUT).unwrap();
        let loaded = load_items(&target, DEFAULT_LOCK_TIMEOUT).unwrap();

        assert_eq!(loaded, items);
    }

    #[test]
    fn load_from_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nope").join("todos.json");

        assert!(load_items(&target, DEFAULT_LOCK_TIMEOUT).unwrap().is_empty());
        assert!(!target.parent().unwrap().exists());
    }

    #[test]
    fn save_waits_for_readers_then_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("todos.json");
        save_items(&target, &[], DEFAULT_LOCK_TIMEOUT).unwrap();
        fs::remove_file(&target).unwrap();
        let _reader =
            StoreReadLock::acquire(&lock_path_for(&target), Duration::from_millis(50))
                .unwrap()
                .expect("lock file exists");

        let err = save_items(&target, &[], Duration::from_millis(20)).unwrap_err();

        assert!(matches!(err, PersistenceError::Lock(_)));
        assert!(!target.exists());
    }
}
