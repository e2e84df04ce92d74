//! File-system helpers used when a store is opened.
use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

/// Create `path` and any missing parents. Returns `true` if it was created.
pub fn ensure_directory(path: impl AsRef<Path>) -> io::Result<bool> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(false)
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Create an empty file at `path` unless one exists. Returns `true` if it was created.
pub fn ensure_file(path: impl AsRef<Path>) -> io::Result<bool> {
    // create_new so an existing file is never truncated
    match OpenOptions::new().write(true).create_new(true).open(path.as_ref()) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Directory holding the running binary.
pub fn current_execution_directory() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory")
    })
}
