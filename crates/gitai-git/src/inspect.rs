//! Read-only inspection of a seeded repository through git2.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{ObjectType, Repository, StatusOptions, TreeWalkMode, TreeWalkResult};

use crate::{Error, Result};

/// Summary of a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Full commit id
    pub id: String,

    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    pub author: String,

    pub email: String,

    pub timestamp: DateTime<Utc>,
}

/// Read-only view of a repository on disk.
pub struct RepoSnapshot {
    repo: Repository,
}

impl std::fmt::Debug for RepoSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoSnapshot")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl RepoSnapshot {
    /// Open the repository whose working tree is `root`.
    pub fn open(root: &Path) -> Result<Self> {
        Ok(Self {
            repo: Repository::open(root)?,
        })
    }

    /// Access the underlying git2 repository.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> Result<usize> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    /// Summary of the commit HEAD points at.
    pub fn head_commit(&self) -> Result<CommitSummary> {
        let commit = self.repo.head()?.peel_to_commit()?;

        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let author = commit.author();

        Ok(CommitSummary {
            id: commit.id().to_string(),
            hash: format!("{:.7}", commit.id()),
            message,
            author: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
            timestamp,
        })
    }

    /// Paths of all files in HEAD's tree, sorted, using `/` separators.
    pub fn head_files(&self) -> Result<Vec<String>> {
        let tree = self.repo.head()?.peel_to_tree()?;
        let mut files = Vec::new();

        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                files.push(format!("{dir}{name}"));
            }
            TreeWalkResult::Ok
        })?;

        files.sort();
        Ok(files)
    }

    /// Content of `path` as committed at HEAD.
    pub fn read_head_file(&self, path: &str) -> Result<String> {
        let tree = self.repo.head()?.peel_to_tree()?;
        let entry = tree.get_path(Path::new(path))?;
        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;

        String::from_utf8(blob.content().to_vec()).map_err(|_| {
            Error::Git(git2::Error::from_str(&format!(
                "{path} at HEAD is not valid UTF-8"
            )))
        })
    }

    /// Whether the working tree and index match HEAD (untracked files count).
    pub fn is_clean(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses.is_empty())
    }
}
