use fs2::FileExt;
use std::{
    fs::{File, OpenOptions},
    io,
    ops::{Deref, DerefMut},
    path::Path,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// an open backing file holding an advisory lock until dropped
pub struct FileLockGuard {
    file: File,
}

impl FileLockGuard {
    /// Open `path` and block until the lock is granted.
    ///
    /// Shared guards are read-only and need an existing file; exclusive ones
    /// are read-write and create the file if it is missing.
    pub fn open(path: &Path, mode: LockMode) -> io::Result<Self> {
        let file = match mode {
            LockMode::Shared => OpenOptions::new().read(true).open(path)?,
            LockMode::Exclusive => {
                OpenOptions::new().read(true).write(true).create(true).open(path)?
            }
        };

        match mode {
            LockMode::Shared => FileExt::lock_shared(&file)?,
            LockMode::Exclusive => FileExt::lock_exclusive(&file)?,
        }

        Ok(FileLockGuard { file })
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release file lock: {}", e);
        }
    }
}

impl Deref for FileLockGuard {
    type Target = File;

    fn deref(&self) -> &File {
        &self.file
    }
}

impl DerefMut for FileLockGuard {
    fn deref_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering::*},
            Arc,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn exclusive_guards_do_not_overlap() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("locked.sanfig");
        File::create(&path).unwrap();

        let inside = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                let inside = inside.clone();
                thread::spawn(move || {
                    let _guard = FileLockGuard::open(&path, LockMode::Exclusive).unwrap();
                    assert_eq!(inside.fetch_add(1, AcqRel), 0);
                    thread::sleep(Duration::from_millis(10));
                    inside.fetch_sub(1, AcqRel);
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn only_exclusive_creates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.sanfig");
        assert!(FileLockGuard::open(&path, LockMode::Shared).is_err());
        assert!(!path.exists());

        drop(FileLockGuard::open(&path, LockMode::Exclusive).unwrap());
        assert!(path.exists());
        assert!(FileLockGuard::open(&path, LockMode::Shared).is_ok());
    }
}
