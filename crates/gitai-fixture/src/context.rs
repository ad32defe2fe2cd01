//! Explicit repository context handed to code under test
//!
//! Code that needs "the current repository" takes a [`RepoContext`] instead
//! of reading the process working directory, so fixtures can run in
//! parallel.

use std::path::{Path, PathBuf};

use gitai_git::{GitCli, GitOutput, RepoSnapshot, SeededRepo};

use crate::Result;

/// A seeded repository and the git runner that seeded it.
#[derive(Debug, Clone)]
pub struct RepoContext {
    git: GitCli,
    seeded: SeededRepo,
}

impl RepoContext {
    pub fn new(git: GitCli, seeded: SeededRepo) -> Self {
        Self { git, seeded }
    }

    /// Working tree root.
    pub fn root(&self) -> &Path {
        &self.seeded.root
    }

    /// Id of the baseline commit created by seeding.
    pub fn head(&self) -> &str {
        &self.seeded.head
    }

    /// Branch the baseline commit was made on.
    pub fn branch(&self) -> &str {
        &self.seeded.branch
    }

    pub fn seeded(&self) -> &SeededRepo {
        &self.seeded
    }

    pub fn git_cli(&self) -> &GitCli {
        &self.git
    }

    /// Resolve a path relative to the root, refusing paths that leave it.
    pub fn join(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(gitai_fs::io::resolve_within(self.root(), relative)?)
    }

    pub fn read_file(&self, relative: impl AsRef<Path>) -> Result<String> {
        let path = self.join(relative)?;
        Ok(gitai_fs::io::read_text(&path)?)
    }

    pub fn write_file(
        &self,
        relative: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> Result<PathBuf> {
        Ok(gitai_fs::io::write_file(self.root(), relative, contents.as_ref())?)
    }

    /// Run `git <args>` in the repository root.
    pub fn git(&self, args: &[&str]) -> Result<GitOutput> {
        Ok(self.git.run(self.root(), args)?)
    }

    /// Open a read-only git2 view of the repository.
    pub fn snapshot(&self) -> Result<RepoSnapshot> {
        Ok(RepoSnapshot::open(self.root())?)
    }
}
