//! Locked document store: full-document JSON persistence under a
//! cooperative exclusive lock.
//!
//! # Protocol
//!
//! - [`load`] takes no lock. A missing (or empty) file yields the zero-value
//!   document; bytes that do not parse yield [`CoreError::CorruptDocument`].
//! - [`save`] locks `<doc>.lock`, serializes the whole document, writes
//!   `<doc>.tmp`, renames it over `<doc>` and releases the lock on every exit
//!   path (the guard unlocks in `Drop`, so a panic while serializing still
//!   releases it).
//!
//! Every mutation is a fresh `load → modify → save`. Saves serialize across
//! processes; loads do not, so a writer that loaded before a concurrent save
//! overwrites it (last save wins). Callers accept this for single-operator
//! CLI usage.
//!
//! The lock lives on the descriptor, not on the file's existence: a lock file
//! left behind by an interrupted process is reused. Where the host cannot
//! lock at all the store logs a warning and proceeds without exclusion.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{io_err, CoreError};
use crate::paths::{lock_path, tmp_path};

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// Load the document at `path`, or `T::default()` when it does not exist.
pub fn load<T>(path: &Path) -> Result<T, CoreError>
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => return Err(io_err(path, err)),
    };
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&contents).map_err(|source| CoreError::CorruptDocument {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// 2. Save
// ---------------------------------------------------------------------------

/// Persist the full document at `path` under the exclusive lock.
pub fn save<T>(path: &Path, document: &T) -> Result<(), CoreError>
where
    T: Serialize,
{
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }

    let _guard = DocumentLock::acquire(&lock_path(path))?;

    let json = serde_json::to_string_pretty(document)?;
    let tmp = tmp_path(path);
    if let Err(err) = std::fs::write(&tmp, json) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&tmp, err));
    }
    set_file_permissions(&tmp)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, err));
    }
    tracing::debug!(path = %path.display(), "document saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Lock guard
// ---------------------------------------------------------------------------

/// Scoped exclusive lock on a `<doc>.lock` file.
///
/// Dropping the guard removes the lock file and then releases the lock.
#[derive(Debug)]
pub struct DocumentLock {
    path: PathBuf,
    /// `None` in degraded mode (host without advisory locks).
    file: Option<File>,
}

impl DocumentLock {
    /// Block until the lock at `path` is held. There is no timeout.
    pub fn acquire(path: &Path) -> Result<Self, CoreError> {
        loop {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
                .map_err(|e| io_err(path, e))?;

            if let Err(err) = file.lock_exclusive() {
                if lock_unsupported(&err) {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "file locking unavailable; saving without mutual exclusion",
                    );
                    return Ok(Self {
                        path: path.to_path_buf(),
                        file: None,
                    });
                }
                return Err(CoreError::Lock {
                    path: path.to_path_buf(),
                    source: err,
                });
            }

            // A previous holder unlinks the lock file on release. If that
            // happened while we waited, our descriptor points at an orphaned
            // inode and a newcomer may lock a fresh file at the same path.
            if still_linked(&file, path) {
                return Ok(Self {
                    path: path.to_path_buf(),
                    file: Some(file),
                });
            }
            tracing::debug!(path = %path.display(), "lock file replaced while waiting; retrying");
        }
    }

    /// `false` when the host provided no lock (degraded mode).
    pub fn is_exclusive(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // Unlink first so no waiter can validate against this inode.
            let _ = std::fs::remove_file(&self.path);
            let _ = FileExt::unlock(&file);
        }
    }
}

// ENOLCK / EOPNOTSUPP, raised by network and FUSE filesystems.
#[cfg(any(target_os = "linux", target_os = "android"))]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[37, 95];
#[cfg(any(target_os = "macos", target_os = "ios"))]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[77, 102];
#[cfg(target_os = "freebsd")]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[77, 45];
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
)))]
const UNSUPPORTED_LOCK_ERRNOS: &[i32] = &[];

fn lock_unsupported(err: &io::Error) -> bool {
    err.kind() == ErrorKind::Unsupported
        || err
            .raw_os_error()
            .is_some_and(|code| UNSUPPORTED_LOCK_ERRNOS.contains(&code))
}

#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> bool {
    path.exists()
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
