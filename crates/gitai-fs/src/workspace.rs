//! Temporary workspace directories with guaranteed removal

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::{Error, Result};

/// Default name prefix for workspace directories.
pub const DEFAULT_PREFIX: &str = "gitai-";

/// Retry settings for removing a workspace directory.
///
/// Removal is retried with exponential backoff because other processes
/// (indexers, virus scanners, a git process that has not fully exited) may
/// briefly hold handles inside the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalPolicy {
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Give up once this much time has passed
    pub max_elapsed: Duration,
}

impl Default for RemovalPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(25),
            max_elapsed: Duration::from_secs(2),
        }
    }
}

/// Options controlling how a workspace is created and released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceOptions {
    /// Directory name prefix
    pub prefix: String,
    /// Parent directory; the system temp directory when `None`
    pub parent: Option<PathBuf>,
    /// Leave the directory on disk when the workspace is released
    pub keep: bool,
    /// Change the process working directory into the workspace
    /// (only honoured by [`ScopedWorkspace`](crate::ScopedWorkspace))
    pub enter: bool,
    pub removal: RemovalPolicy,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            parent: None,
            keep: false,
            enter: false,
            removal: RemovalPolicy::default(),
        }
    }
}

impl WorkspaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn in_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    pub fn enter(mut self, enter: bool) -> Self {
        self.enter = enter;
        self
    }

    pub fn with_removal(mut self, removal: RemovalPolicy) -> Self {
        self.removal = removal;
        self
    }
}

/// A freshly created, uniquely named, empty directory.
///
/// The directory is removed when the workspace is dropped or when
/// [`Workspace::remove`] is called, unless it was created with
/// `keep` or [`Workspace::persist`] was called.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    armed: bool,
    removal: RemovalPolicy,
}

impl Workspace {
    /// Create a workspace in the system temp directory with default options.
    pub fn create() -> Result<Self> {
        Self::with_options(&WorkspaceOptions::default())
    }

    /// Create a workspace according to `options`.
    ///
    /// The stored path is canonical, so it compares equal to
    /// `std::env::current_dir()` after changing into it even where the temp
    /// root is reached through a symlink (`/var` -> `/private/var`).
    pub fn with_options(options: &WorkspaceOptions) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&options.prefix);

        let dir = match &options.parent {
            Some(parent) => builder
                .tempdir_in(parent)
                .map_err(|e| Error::io(parent, e))?,
            None => builder
                .tempdir()
                .map_err(|e| Error::io(std::env::temp_dir(), e))?,
        };

        let path = dunce::canonicalize(dir.path()).map_err(|e| Error::io(dir.path(), e))?;
        // Removal is ours from here on so it can be retried and reported
        let _ = dir.keep();

        tracing::debug!(path = %path.display(), keep = options.keep, "Created workspace");

        Ok(Self {
            path,
            armed: !options.keep,
            removal: options.removal,
        })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory will be left on disk on release.
    pub fn is_kept(&self) -> bool {
        !self.armed
    }

    /// Disarm removal and hand the directory over to the caller.
    pub fn persist(mut self) -> PathBuf {
        self.armed = false;
        tracing::info!(path = %self.path.display(), "Keeping workspace");
        std::mem::take(&mut self.path)
    }

    /// Remove the directory now, reporting failure.
    ///
    /// A directory that no longer exists counts as removed. Kept
    /// workspaces are left alone.
    pub fn remove(mut self) -> Result<()> {
        self.release()
    }

    pub(crate) fn release(&mut self) -> Result<()> {
        if !self.armed {
            return Ok(());
        }
        self.armed = false;
        remove_dir_with_retry(&self.path, &self.removal)?;
        tracing::debug!(path = %self.path.display(), "Removed workspace");
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove workspace"
            );
        }
    }
}

/// Remove `path` and everything below it, retrying transient failures.
///
/// Only failures another process can clear by letting go of the directory
/// are retried; anything else is reported on the first attempt.
pub fn remove_dir_with_retry(path: &Path, policy: &RemovalPolicy) -> Result<()> {
    retry_removal(path, policy, |path| fs::remove_dir_all(path))
}

fn retry_removal(
    path: &Path,
    policy: &RemovalPolicy,
    mut remove: impl FnMut(&Path) -> io::Result<()>,
) -> Result<()> {
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.initial_interval)
        .with_max_elapsed_time(Some(policy.max_elapsed))
        .build();

    let op = || match remove(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) if is_transient(&e) => {
            tracing::debug!(path = %path.display(), error = %e, "Retrying workspace removal");
            #[cfg(windows)]
            clear_readonly(path);
            Err(backoff::Error::transient(e))
        }
        Err(e) => Err(backoff::Error::permanent(e)),
    };

    backoff::retry(backoff, op).map_err(|e| match e {
        backoff::Error::Permanent(err) | backoff::Error::Transient { err, .. } => {
            Error::io(path, err)
        }
    })
}

/// Windows sharing violation: another process has the file open.
#[cfg(windows)]
const ERROR_SHARING_VIOLATION: i32 = 32;

fn is_transient(e: &io::Error) -> bool {
    match e.kind() {
        // A process still writing into the tree, or a handle being closed
        io::ErrorKind::DirectoryNotEmpty
        | io::ErrorKind::ResourceBusy
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => true,
        // Open handles and read-only git objects both surface as this
        #[cfg(windows)]
        io::ErrorKind::PermissionDenied => true,
        _ => {
            #[cfg(windows)]
            if e.raw_os_error() == Some(ERROR_SHARING_VIOLATION) {
                return true;
            }
            false
        }
    }
}

/// Git marks object files read-only, which blocks deletion on Windows.
#[cfg(windows)]
fn clear_readonly(path: &Path) {
    let Ok(entries) = fs::read_dir(path) else {
        return;
    };
    for entry in entries.flatten() {
        let entry_path = entry.path();
        if entry_path.is_dir() {
            clear_readonly(&entry_path);
        } else if let Ok(metadata) = entry.metadata() {
            let mut perms = metadata.permissions();
            if perms.readonly() {
                #[allow(clippy::permissions_set_readonly_false)]
                perms.set_readonly(false);
                let _ = fs::set_permissions(&entry_path, perms);
            }
        }
    }
}
