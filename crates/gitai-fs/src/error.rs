//! Error types for gitai-fs

use std::path::PathBuf;

/// Result type for gitai-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitai-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read the current working directory: {source}")]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },

    #[error("Could not change working directory to {path}: {source}")]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A working-directory guard is already held by this thread")]
    NestedCwdGuard,

    #[error("Path escapes the workspace root: {path}")]
    PathEscape { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Workspace release failed: {}", join_failures(.failures))]
    Release { failures: Vec<Error> },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn join_failures(failures: &[Error]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
