use crate::error::ErrorCode;
use fs2::FileExt;
use std::{
    ffi::OsString,
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

/// Default wait before giving up on a contended store lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Advisory lock errors for the store file.
#[derive(Debug)]
pub enum LockError {
    Timeout { path: PathBuf, waited: Duration },
    IoError { path: PathBuf, source: io::Error },
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError { .. } => ErrorCode::StoreWriteFailed,
        }
    }

    /// Optional remediation hint for the user.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { path, waited } => {
                write!(
                    f,
                    "{}: lock timed out after {:?} at {}",
                    self.code().code(),
                    waited,
                    path.display()
                )
            }
            Self::IoError { path, source } => {
                write!(f, "{}: {} ({})", self.code().code(), source, path.display())
            }
        }
    }
}

impl std::error::Error for LockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::IoError { source, .. } => Some(source),
        }
    }
}

/// Lock file that guards `store_path`: the same name with `.lock` appended.
#[must_use]
pub fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map_or_else(|| OsString::from("store"), ToOwned::to_owned);
    name.push(".lock");
    store_path.with_file_name(name)
}

fn is_unlockable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::ReadOnlyFilesystem
    )
}

#[derive(Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

#[derive(Debug)]
struct FileGuard {
    file: File,
    path: PathBuf,
}

impl FileGuard {
    /// Writers create the lock file on demand, but never its directory: a
    /// store in a missing directory must fail rather than conjure the
    /// directory. Readers only open an existing lock file.
    fn acquire(path: &Path, timeout: Duration, kind: LockKind) -> Result<Self, LockError> {
        let io_err = |source| LockError::IoError {
            path: path.to_path_buf(),
            source,
        };

        let start = Instant::now();
        loop {
            let file = match kind {
                LockKind::Shared => OpenOptions::new().read(true).open(path),
                LockKind::Exclusive => OpenOptions::new()
                    .create(true)
                    .read(true)
                    .write(true)
                    .truncate(false)
                    .open(path),
            }
            .map_err(io_err)?;

            let contended = match kind {
                LockKind::Shared => file.try_lock_shared().is_err(),
                LockKind::Exclusive => file.try_lock_exclusive().is_err(),
            };

            if !contended {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }

            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            tracing::trace!(path = %path.display(), "store lock busy, retrying");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn release(self) {
        let _ = self.file.unlock();
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// RAII guard for the exclusive lock held while a save replaces the file.
#[derive(Debug)]
pub struct StoreWriteLock {
    guard: FileGuard,
}

impl StoreWriteLock {
    /// Acquire an exclusive advisory lock on the lock path.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Timeout`] if another holder keeps the lock past
    /// `timeout`, or [`LockError::IoError`] if the lock file cannot be opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        Ok(Self {
            guard: FileGuard::acquire(path, timeout, LockKind::Exclusive)?,
        })
    }

    /// Explicitly release the lock. Release also happens automatically on drop.
    pub fn release(self) {
        self.guard.release();
    }

    /// Return the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.guard.path()
    }
}

/// RAII guard for the shared lock held while a load reads the file.
#[derive(Debug)]
pub struct StoreReadLock {
    guard: FileGuard,
}

impl StoreReadLock {
    /// Acquire a shared advisory lock on the lock path.
    ///
    /// Returns `Ok(None)` when the lock file is absent or cannot be opened
    /// for reading because of permissions or a read-only filesystem. No
    /// writer can hold the lock then, and saves replace the store file by
    /// rename, so reading without the lock is sound.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Timeout`] while a writer holds the lock past
    /// `timeout`, or [`LockError::IoError`] for any other open failure.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Option<Self>, LockError> {
        match FileGuard::acquire(path, timeout, LockKind::Shared) {
            Ok(guard) => Ok(Some(Self { guard })),
            Err(LockError::IoError { source, .. }) if is_unlockable(&source) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %source,
                    "no usable lock file, reading unlocked"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Explicitly release the lock. Release also happens automatically on drop.
    pub fn release(self) {
        self.guard.release();
    }

    /// Return the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.guard.path()
    }
}

#[cfg(test)]
mod tests {
    use super::{LockError, StoreReadLock, StoreWriteLock, lock_path_for};
    use crate::error::ErrorCode;
    use std::{
        path::{Path, PathBuf},
        sync::{Arc, Barrier},
        thread,
        time::Duration,
    };

    fn lock_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn lock_path_appends_suffix() {
        assert_eq!(
            lock_path_for(Path::new("/tmp/x/todos.json")),
            PathBuf::from("/tmp/x/todos.json.lock")
        );
    }

    #[test]
    fn write_lock_allows_acquire_and_release() -> Result<(), LockError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(&dir, "basic.lock");
        let lock = StoreWriteLock::acquire(&path, Duration::from_millis(50))?;
        assert_eq!(lock.path(), path.as_path());
        lock.release();
        Ok(())
    }

    #[test]
    fn write_lock_times_out_when_held() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(&dir, "timeout.lock");
        let _guard = StoreWriteLock::acquire(&path, Duration::from_millis(50)).unwrap();
        let err = StoreWriteLock::acquire(&path, Duration::from_millis(20)).unwrap_err();

        assert!(matches!(err, LockError::Timeout { path: p, .. } if p == path));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent").join("todos.json.lock");
        let err = StoreWriteLock::acquire(&path, Duration::from_millis(20)).unwrap_err();

        assert!(matches!(err, LockError::IoError { .. }));
        assert_eq!(err.code(), ErrorCode::StoreWriteFailed);
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn lock_error_maps_to_machine_code() {
        let timeout = LockError::Timeout {
            path: PathBuf::from("code.lock"),
            waited: Duration::from_millis(10),
        };
        assert_eq!(timeout.code(), ErrorCode::LockContention);
        assert!(timeout.hint().is_some());
    }

    #[test]
    fn read_locks_are_compatible() -> Result<(), LockError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(&dir, "read-share.lock");
        StoreWriteLock::acquire(&path, Duration::from_millis(50))?.release();

        let first = StoreReadLock::acquire(&path, Duration::from_millis(50))?.expect("lock file");
        let second = StoreReadLock::acquire(&path, Duration::from_millis(50))?.expect("lock file");

        first.release();
        second.release();
        Ok(())
    }

    #[test]
    fn read_lock_never_creates_the_lock_file() -> Result<(), LockError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(&dir, "absent.lock");

        assert!(StoreReadLock::acquire(&path, Duration::from_millis(20))?.is_none());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn read_lock_in_missing_directory_is_skipped() -> Result<(), LockError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent").join("todos.json.lock");

        assert!(StoreReadLock::acquire(&path, Duration::from_millis(20))?.is_none());
        Ok(())
    }

    #[test]
    fn write_blocks_readers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(&dir, "write-blocks-read.lock");
        let _write = StoreWriteLock::acquire(&path, Duration::from_millis(50)).unwrap();

        let started = std::time::Instant::now();
        let read = StoreReadLock::acquire(&path, Duration::from_millis(20));

        assert!(matches!(read, Err(LockError::Timeout { .. })));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn contention_is_resolved_after_writer_releases() -> Result<(), LockError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(&dir, "thread.lock");

        let blocker = Arc::new(Barrier::new(2));
        let waiter = Arc::new(Barrier::new(2));

        let blocker_thread = Arc::clone(&blocker);
        let waiter_thread = Arc::clone(&waiter);
        let path_in_thread = path.clone();
        let handle = thread::spawn(move || {
            let _writer =
                StoreWriteLock::acquire(&path_in_thread, Duration::from_millis(200)).unwrap();
            blocker_thread.wait();
            waiter_thread.wait();
        });

        blocker.wait();
        assert!(matches!(
            StoreReadLock::acquire(&path, Duration::from_millis(20)),
            Err(LockError::Timeout { .. })
        ));
        waiter.wait();
        handle.join().unwrap();

        let follow_up = StoreWriteLock::acquire(&path, Duration::from_millis(50))?;
        follow_up.release();
        Ok(())
    }
}
