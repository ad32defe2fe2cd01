//! Seeded temporary git repositories for GitAI tests
//!
//! [`TempGitRepo`] provisions a throwaway directory, seeds it with one commit
//! and hands out a [`RepoContext`]. [`SubjectFixture`] additionally builds an
//! object under test through the [`Subject`] trait. Everything is torn down
//! when the fixture is dropped, including on panic.
//!
//! # Example
//!
//! ```rust,no_run
//! use gitai_fixture::TempGitRepo;
//!
//! let repo = TempGitRepo::new()?;
//! assert_eq!(repo.context().read_file("README.md")?, "# Test Repository\n");
//! repo.close()?;
//! # Ok::<(), gitai_fixture::FixtureError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod subject;

pub use config::FixtureConfig;
pub use context::RepoContext;
pub use error::{FixtureError, Result};
pub use fixture::{SubjectFixture, TempGitRepo, with_subject, with_temp_git_repo};
pub use subject::Subject;
