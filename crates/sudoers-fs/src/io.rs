//! Locked I/O primitives for the sudoers drop-in.
//!
//! Creation goes through write-to-temp-then-rename so a reader never observes a
//! half-written drop-in; appends hold an advisory lock on the target itself.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Report whether a file exists.
///
/// Only a missing file maps to `Ok(false)`; any other `stat` failure
/// (permission denied, I/O error) is returned.
pub fn is_present(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::metadata(&native_path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(native_path, e)),
    }
}

/// Write content atomically to a file with locking.
///
/// When `mode` is given it is applied to the temp file before the rename, so
/// the target never exists with looser permissions.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], mode: Option<u32>) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = write_locked(&mut temp_file, content, &native_path, &temp_path);
    drop(temp_file);

    // Any failure past this point must not leave the temp file behind
    let result = written
        .and_then(|()| mode.map_or(Ok(()), |mode| set_mode(&temp_path, mode)))
        .and_then(|()| fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e)));
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    tracing::debug!(path = %path, bytes = content.len(), "Wrote file atomically");
    Ok(())
}

/// Append content to an existing file under an exclusive lock.
///
/// The file must already exist; its permissions are left untouched.
pub fn append_locked(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    let mut file = OpenOptions::new()
        .append(true)
        .open(&native_path)
        .map_err(|e| Error::io(&native_path, e))?;

    write_locked(&mut file, content, &native_path, &native_path)?;
    tracing::debug!(path = %path, bytes = content.len(), "Appended to file");
    Ok(())
}

/// Write and fsync `content` while holding an exclusive lock on `file`.
///
/// `target` names the lock in errors, `written_path` the write.
fn write_locked(file: &mut File, content: &[u8], target: &Path, written_path: &Path) -> Result<()> {
    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    let written = file
        .write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::io(written_path, e));

    FileExt::unlock(&*file).map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    written
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read a file as raw bytes; the drop-in may hold text in any encoding.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Remove a file.
///
/// Returns `Ok(false)` when there was nothing to remove.
pub fn remove_file(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_file(&native_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(native_path, e)),
    }
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(path: &std::path::Path, _mode: u32) -> Result<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions();
    permissions.set_readonly(true);
    fs::set_permissions(path, permissions).map_err(|e| Error::io(path, e))
}
