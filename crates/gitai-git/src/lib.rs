//! Git plumbing for GitAI test fixtures
//!
//! Runs the external `git` binary to seed throwaway repositories and reads
//! the result back through `git2`.

pub mod command;
pub mod error;
pub mod inspect;
pub mod seed;

pub use command::{GitCli, GitOutput};
pub use error::{Error, Result};
pub use inspect::{CommitSummary, RepoSnapshot};
pub use seed::{Identity, SeedFile, SeedPlan, SeededRepo, Seeder};
