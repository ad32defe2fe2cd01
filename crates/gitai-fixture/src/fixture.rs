//! The seeded-repository and subject fixtures

use std::path::Path;

use gitai_fs::{CwdGuard, ScopedWorkspace};
use gitai_git::Seeder;

use crate::{FixtureConfig, FixtureError, RepoContext, Result, Subject};

/// A temporary directory holding a freshly seeded git repository.
///
/// Provision, seed, then hand out the [`RepoContext`]. Dropping the fixture
/// restores the working directory (legacy enter mode only) and removes the
/// directory; [`TempGitRepo::close`] does the same and reports failures.
#[derive(Debug)]
pub struct TempGitRepo {
    context: RepoContext,
    scope: ScopedWorkspace,
}

impl TempGitRepo {
    /// Seed a repository using configuration resolved from the environment.
    pub fn new() -> Result<Self> {
        Self::with_config(&FixtureConfig::resolve()?)
    }

    /// Seed a repository using `config`.
    ///
    /// If any seeding step fails the workspace is released before the error
    /// is returned.
    pub fn with_config(config: &FixtureConfig) -> Result<Self> {
        let scope = ScopedWorkspace::acquire(&config.workspace_options())?;
        let git = config.git_cli();

        let seeded = match Seeder::new(&git).seed(scope.path(), &config.seed) {
            Ok(seeded) => seeded,
            Err(e) => {
                tracing::debug!(error = %e, "Seeding failed, releasing workspace");
                if let Err(release) = scope.release() {
                    tracing::warn!(error = %release, "Release after failed seeding also failed");
                }
                return Err(e.into());
            }
        };

        tracing::debug!(
            root = %seeded.root.display(),
            head = %seeded.head,
            entered = scope.is_entered(),
            "Temporary git repository ready"
        );

        Ok(Self {
            context: RepoContext::new(git, seeded),
            scope,
        })
    }

    pub fn path(&self) -> &Path {
        self.scope.path()
    }

    pub fn context(&self) -> &RepoContext {
        &self.context
    }

    /// Whether the process working directory is inside the repository.
    pub fn is_entered(&self) -> bool {
        self.scope.is_entered()
    }

    /// Change the process working directory into the repository until the
    /// returned guard is dropped.
    ///
    /// Fails with [`gitai_fs::Error::NestedCwdGuard`] when the fixture was
    /// created in enter mode on this thread.
    pub fn enter(&self) -> Result<CwdGuard> {
        Ok(CwdGuard::enter(self.path())?)
    }

    /// Build a subject inside this repository.
    pub fn construct<S: Subject>(&self) -> Result<S> {
        S::construct(&self.context).map_err(|e| FixtureError::subject::<S>(e.into()))
    }

    /// Build a subject with an ad-hoc constructor.
    pub fn construct_with<S, E>(
        &self,
        build: impl FnOnce(&RepoContext) -> std::result::Result<S, E>,
    ) -> Result<S>
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        build(&self.context).map_err(|e| FixtureError::subject::<S>(e.into()))
    }

    /// Tear the repository down, reporting any release failure.
    pub fn close(self) -> Result<()> {
        let Self { scope, .. } = self;
        scope.release()?;
        Ok(())
    }
}

/// A seeded repository plus an object under test built inside it.
///
/// The subject is dropped before the repository is torn down.
#[derive(Debug)]
pub struct SubjectFixture<S> {
    // Declared first so it drops before the repository
    subject: S,
    repo: TempGitRepo,
}

impl<S: Subject> SubjectFixture<S> {
    /// Seed a repository from environment configuration and build the subject.
    pub fn new() -> Result<Self> {
        Self::with_config(&FixtureConfig::resolve()?)
    }

    /// Seed a repository from `config` and build the subject.
    ///
    /// No subject is constructed unless seeding succeeded.
    pub fn with_config(config: &FixtureConfig) -> Result<Self> {
        let repo = TempGitRepo::with_config(config)?;
        let subject = repo.construct::<S>()?;
        Ok(Self { subject, repo })
    }
}

impl<S> SubjectFixture<S> {
    pub fn subject(&self) -> &S {
        &self.subject
    }

    pub fn subject_mut(&mut self) -> &mut S {
        &mut self.subject
    }

    pub fn repo(&self) -> &TempGitRepo {
        &self.repo
    }

    pub fn context(&self) -> &RepoContext {
        self.repo.context()
    }

    /// Mutable subject alongside the repository context.
    pub fn split_mut(&mut self) -> (&mut S, &RepoContext) {
        (&mut self.subject, self.repo.context())
    }

    /// Drop the subject, then tear the repository down.
    pub fn close(self) -> Result<()> {
        let Self { subject, repo } = self;
        drop(subject);
        repo.close()
    }
}

/// Run `body` against a fresh repository, then tear it down.
///
/// A panic in `body` still releases the repository while unwinding.
pub fn with_temp_git_repo<T>(body: impl FnOnce(&RepoContext) -> T) -> Result<T> {
    let repo = TempGitRepo::new()?;
    let out = body(repo.context());
    repo.close()?;
    Ok(out)
}

/// Run `body` against a fresh subject and its repository, then tear both down.
pub fn with_subject<S: Subject, T>(body: impl FnOnce(&mut S, &RepoContext) -> T) -> Result<T> {
    let mut fixture = SubjectFixture::<S>::new()?;
    let out = {
        let (subject, context) = fixture.split_mut();
        body(subject, context)
    };
    fixture.close()?;
    Ok(out)
}
