//! Locked, atomic I/O for the persisted stores
//!
//! Registry records and the group ledger are small TOML documents that other
//! tooling may read while a batch is being applied. Writes go through a
//! temp-file-then-rename sequence under an exclusive advisory lock; reads
//! take a shared lock.

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Write `contents` to `path` atomically.
///
/// The data lands in a sibling temp file first and is renamed over the
/// destination, so readers never observe a partially written document. The
/// destination is exclusively locked for the duration to serialize writers
/// across processes.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Create or open the target file for locking
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    lock_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed { path: path.into() })?;

    let temp_path = temp_sibling(path);
    let result = (|| {
        let mut temp_file = File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
    })();

    if result.is_err() {
        // Don't leave temp files next to the store on a failed write.
        let _ = fs::remove_file(&temp_path);
    } else {
        debug!(path = %path.display(), "wrote store document");
    }
    // Lock released when lock_file is dropped
    result
}

/// Read `path` to a string under a shared lock.
///
/// Reads through the locked handle to avoid a TOCTOU race with a concurrent
/// writer renaming over the path.
pub fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    file.lock_shared()
        .map_err(|_| Error::LockFailed { path: path.into() })?;

    let mut contents = String::new();
    (&file)
        .read_to_string(&mut contents)
        .map_err(|e| Error::io(path, e))?;
    // Lock released when file is dropped
    Ok(contents)
}

/// Remove `path`, tolerating a file that is already gone.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

// Temp file in the same directory, so the rename stays on one filesystem.
fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
