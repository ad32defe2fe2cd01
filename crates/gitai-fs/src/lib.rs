//! Filesystem plumbing for GitAI test fixtures
//!
//! Provides temporary workspaces that clean up after themselves, a guard for
//! the process working directory, and the composed [`ScopedWorkspace`] that
//! releases both in reverse order.

pub mod cwd;
pub mod error;
pub mod io;
pub mod scope;
pub mod workspace;

pub use cwd::CwdGuard;
pub use error::{Error, Result};
pub use scope::ScopedWorkspace;
pub use workspace::{RemovalPolicy, Workspace, WorkspaceOptions};
