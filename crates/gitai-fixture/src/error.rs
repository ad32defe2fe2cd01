//! Error types for gitai-fixture

use std::path::PathBuf;

/// Result type for fixture operations
pub type Result<T> = std::result::Result<T, FixtureError>;

/// Errors that can occur while setting up or tearing down a fixture
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Workspace error: {0}")]
    Fs(#[from] gitai_fs::Error),

    #[error("Seeding error: {0}")]
    Git(#[from] gitai_git::Error),

    #[error("Invalid fixture config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Failed to construct {subject}: {source}")]
    Subject {
        /// Type name of the subject
        subject: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FixtureError {
    pub(crate) fn subject<S>(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Subject {
            subject: std::any::type_name::<S>(),
            source,
        }
    }
}
