//! Composed guard over a workspace and, optionally, the working directory
//!
//! Acquisition order is: create directory, then enter it. Release runs in
//! reverse: restore the working directory, then remove the directory. A
//! failure in one release step never skips the other.

use std::path::Path;

use crate::{CwdGuard, Error, Result, Workspace, WorkspaceOptions};

/// A temporary workspace, optionally entered as the process working directory.
#[derive(Debug)]
pub struct ScopedWorkspace {
    cwd: Option<CwdGuard>,
    workspace: Option<Workspace>,
}

impl ScopedWorkspace {
    /// Create the workspace and, if `options.enter` is set, change into it.
    ///
    /// If entering fails the new directory is removed before the error is
    /// returned.
    pub fn acquire(options: &WorkspaceOptions) -> Result<Self> {
        let workspace = Workspace::with_options(options)?;

        let cwd = if options.enter {
            // On error `workspace` drops here and removes the directory
            Some(CwdGuard::enter(workspace.path())?)
        } else {
            None
        };

        Ok(Self {
            cwd,
            workspace: Some(workspace),
        })
    }

    /// Root of the workspace.
    pub fn path(&self) -> &Path {
        self.workspace
            .as_ref()
            .map(Workspace::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Whether the process working directory was changed into the workspace.
    pub fn is_entered(&self) -> bool {
        self.cwd.is_some()
    }

    /// Working directory that will be restored, when entered.
    pub fn original_dir(&self) -> Option<&Path> {
        self.cwd.as_ref().map(CwdGuard::original)
    }

    /// Release both resources and report every failure.
    pub fn release(mut self) -> Result<()> {
        let failures = self.release_all();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Release { failures })
        }
    }

    fn release_all(&mut self) -> Vec<Error> {
        let mut failures = Vec::new();

        if let Some(mut cwd) = self.cwd.take()
            && let Err(e) = cwd.release()
        {
            failures.push(e);
        }

        if let Some(mut workspace) = self.workspace.take()
            && let Err(e) = workspace.release()
        {
            failures.push(e);
        }

        failures
    }
}

impl Drop for ScopedWorkspace {
    fn drop(&mut self) {
        for failure in self.release_all() {
            tracing::warn!(error = %failure, "Workspace release step failed");
        }
    }
}
