//! Seeding of throwaway repositories with a single baseline commit

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{Error, GitCli, Result};

/// Content of the README written by the default plan.
pub const DEFAULT_README: &str = "# Test Repository\n";

/// Message of the commit created by the default plan.
pub const DEFAULT_MESSAGE: &str = "Initial commit";

/// `git init --initial-branch` first shipped in 2.28.
const INITIAL_BRANCH_SINCE: Version = Version::new(2, 28, 0);

/// Author and committer identity configured in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        }
    }
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A file written and staged before the baseline commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    /// Path relative to the repository root
    pub path: String,
    pub contents: String,
}

impl SeedFile {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// What the seeder puts into a fresh repository.
///
/// The default plan configures `Test User <test@example.com>`, writes
/// `README.md` containing `# Test Repository\n`, and commits it as
/// `Initial commit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedPlan {
    pub identity: Identity,
    pub files: Vec<SeedFile>,
    pub message: String,
    /// Branch name for the baseline commit; git's default when `None`
    pub initial_branch: Option<String>,
    /// Set `commit.gpgsign = false` so a signing setup on the host
    /// cannot break seeding
    pub disable_gpg_signing: bool,
    /// Fixed author/committer date, making the commit id reproducible
    pub commit_date: Option<DateTime<Utc>>,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            files: vec![SeedFile::new("README.md", DEFAULT_README)],
            message: DEFAULT_MESSAGE.to_string(),
            initial_branch: None,
            disable_gpg_signing: true,
            commit_date: None,
        }
    }
}

impl SeedPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Add a file to the plan, after any already present.
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.push(SeedFile::new(path, contents));
        self
    }

    /// Drop all files; the baseline commit will be empty.
    pub fn without_files(mut self) -> Self {
        self.files.clear();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.initial_branch = Some(branch.into());
        self
    }

    pub fn at_date(mut self, date: DateTime<Utc>) -> Self {
        self.commit_date = Some(date);
        self
    }

    /// Check the plan before any process is spawned.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidPlan { message });

        if self.message.trim().is_empty() {
            return invalid("commit message is empty".into());
        }
        if self.identity.name.trim().is_empty() || self.identity.email.trim().is_empty() {
            return invalid("identity needs both a name and an email".into());
        }
        if let Some(branch) = &self.initial_branch
            && (branch.trim().is_empty() || branch.contains(char::is_whitespace))
        {
            return invalid(format!("branch name {branch:?} is not usable"));
        }
        for file in &self.files {
            if gitai_fs::io::resolve_within(Path::new(""), &file.path).is_err() {
                return invalid(format!("seed file {:?} escapes the repository", file.path));
            }
        }
        Ok(())
    }
}

/// Result of seeding, as reported by git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRepo {
    pub root: PathBuf,
    /// Full id of the baseline commit
    pub head: String,
    pub branch: String,
}

/// Seeds repositories through the git CLI.
#[derive(Debug, Clone, Copy)]
pub struct Seeder<'a> {
    git: &'a GitCli,
}

impl<'a> Seeder<'a> {
    pub fn new(git: &'a GitCli) -> Self {
        Self { git }
    }

    /// Initialize a repository in `dir` and create the baseline commit.
    ///
    /// Steps run strictly in order and the first failure aborts seeding:
    /// init, identity config, optional signing config, write files, stage
    /// them, commit. There are no retries.
    ///
    /// Nothing is written if git resolves the repository anywhere other
    /// than `dir/.git`, which happens when a non-isolated runner inherits
    /// `GIT_DIR` from a hook.
    pub fn seed(&self, dir: &Path, plan: &SeedPlan) -> Result<SeededRepo> {
        plan.validate()?;

        let (init_flag, rename_after) = match &plan.initial_branch {
            Some(branch) if self.git.version()? >= INITIAL_BRANCH_SINCE => {
                (Some(format!("--initial-branch={branch}")), None)
            }
            Some(branch) => (None, Some(branch.as_str())),
            None => (None, None),
        };

        let mut init_args = vec!["init"];
        if let Some(flag) = &init_flag {
            init_args.push(flag.as_str());
        }
        self.git.run(dir, &init_args)?;
        self.verify_git_dir(dir)?;

        self.git
            .run(dir, &["config", "user.name", plan.identity.name.as_str()])?;
        self.git
            .run(dir, &["config", "user.email", plan.identity.email.as_str()])?;
        if plan.disable_gpg_signing {
            self.git.run(dir, &["config", "commit.gpgsign", "false"])?;
        }

        for file in &plan.files {
            gitai_fs::io::write_file(dir, &file.path, file.contents.as_bytes())?;
        }
        for file in &plan.files {
            self.git.run(dir, &["add", "--", file.path.as_str()])?;
        }

        let mut commit_args = vec!["commit", "-m", plan.message.as_str()];
        if plan.files.is_empty() {
            commit_args.push("--allow-empty");
        }
        let date_env = plan
            .commit_date
            .map(|date| {
                // git's internal date format: unix seconds and offset
                let raw = format!("{} +0000", date.timestamp());
                vec![
                    ("GIT_AUTHOR_DATE", raw.clone()),
                    ("GIT_COMMITTER_DATE", raw),
                ]
            })
            .unwrap_or_default();
        self.git.run_with_env(dir, &commit_args, &date_env)?;

        if let Some(branch) = rename_after {
            self.git.run(dir, &["branch", "-m", branch])?;
        }

        let head = self.git.run(dir, &["rev-parse", "HEAD"])?.trimmed().to_string();
        let branch = self
            .git
            .run(dir, &["symbolic-ref", "--short", "HEAD"])?
            .trimmed()
            .to_string();

        tracing::debug!(
            root = %dir.display(),
            head = %head,
            branch = %branch,
            files = plan.files.len(),
            "Seeded repository"
        );

        Ok(SeededRepo {
            root: dir.to_path_buf(),
            head,
            branch,
        })
    }

    fn verify_git_dir(&self, dir: &Path) -> Result<()> {
        let output = self.git.run(dir, &["rev-parse", "--absolute-git-dir"])?;
        let git_dir = PathBuf::from(output.trimmed());

        let expected = dunce::canonicalize(dir.join(".git")).ok();
        let actual = dunce::canonicalize(&git_dir).ok();
        if expected.is_none() || expected != actual {
            return Err(Error::ForeignRepository {
                dir: dir.to_path_buf(),
                git_dir,
            });
        }
        Ok(())
    }
}
