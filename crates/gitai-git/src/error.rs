//! Error types for gitai-git

use std::path::PathBuf;

/// Result type for gitai-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitai-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git executable not found: {program}")]
    GitNotFound { program: PathBuf },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {}` failed ({}): {}", .args, exit_label(*.code), .stderr)]
    CommandFailed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid seed plan: {message}")]
    InvalidPlan { message: String },

    #[error("git resolved the repository for {} to {}", .dir.display(), .git_dir.display())]
    ForeignRepository { dir: PathBuf, git_dir: PathBuf },

    #[error("Could not parse git version from {output:?}")]
    VersionParse { output: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] gitai_fs::Error),
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
