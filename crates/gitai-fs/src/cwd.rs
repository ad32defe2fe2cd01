//! Guard for the process working directory
//!
//! The working directory is process-wide state. Guards serialize on a global
//! lock so two of them never interleave, and each thread may hold at most
//! one guard at a time.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{Error, Result};

static CWD_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static HELD: Cell<bool> = const { Cell::new(false) };
}

/// Changes the process working directory and changes it back on release.
///
/// # Example
///
/// ```rust,no_run
/// use gitai_fs::CwdGuard;
///
/// let guard = CwdGuard::enter(std::path::Path::new("/tmp"))?;
/// // ... code that reads std::env::current_dir() ...
/// guard.restore()?;
/// # Ok::<(), gitai_fs::Error>(())
/// ```
#[derive(Debug)]
pub struct CwdGuard {
    original: PathBuf,
    entered: PathBuf,
    restored: bool,
    _lock: MutexGuard<'static, ()>,
}

impl CwdGuard {
    /// Record the current directory and change into `path`.
    ///
    /// Blocks while another thread holds a guard. Fails with
    /// [`Error::NestedCwdGuard`] if this thread already holds one.
    pub fn enter(path: &Path) -> Result<Self> {
        if HELD.with(Cell::get) {
            return Err(Error::NestedCwdGuard);
        }

        // A test that panicked while holding a guard poisons the lock, but
        // its guard still restored the directory on unwind.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let original = std::env::current_dir().map_err(|source| Error::CurrentDir { source })?;
        std::env::set_current_dir(path).map_err(|source| Error::ChangeDir {
            path: path.to_path_buf(),
            source,
        })?;
        HELD.with(|held| held.set(true));

        tracing::debug!(
            from = %original.display(),
            to = %path.display(),
            "Entered working directory"
        );

        Ok(Self {
            original,
            entered: path.to_path_buf(),
            restored: false,
            _lock: lock,
        })
    }

    /// Working directory recorded when the guard was created.
    pub fn original(&self) -> &Path {
        &self.original
    }

    /// Directory the guard changed into.
    pub fn entered(&self) -> &Path {
        &self.entered
    }

    /// Change back to the original directory, reporting failure.
    pub fn restore(mut self) -> Result<()> {
        self.release()
    }

    pub(crate) fn release(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        HELD.with(|held| held.set(false));

        std::env::set_current_dir(&self.original).map_err(|source| Error::ChangeDir {
            path: self.original.clone(),
            source,
        })?;
        tracing::debug!(to = %self.original.display(), "Restored working directory");
        Ok(())
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "Failed to restore working directory");
        }
    }
}
