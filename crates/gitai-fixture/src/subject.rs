//! The capability a fixture needs from an object under test

use gitai_git::RepoSnapshot;

use crate::RepoContext;

/// An object under test that can be built inside a seeded repository.
///
/// Construction takes nothing but the repository context; anything else the
/// subject needs it must derive from there.
///
/// ```rust,no_run
/// use gitai_fixture::{RepoContext, Subject, with_subject};
///
/// struct Tool {
///     root: std::path::PathBuf,
/// }
///
/// impl Subject for Tool {
///     type Error = std::convert::Infallible;
///
///     fn construct(ctx: &RepoContext) -> Result<Self, Self::Error> {
///         Ok(Self { root: ctx.root().to_path_buf() })
///     }
/// }
///
/// with_subject(|tool: &mut Tool, ctx| assert_eq!(tool.root, ctx.root()))?;
/// # Ok::<(), gitai_fixture::FixtureError>(())
/// ```
pub trait Subject: Sized {
    type Error: Into<Box<dyn std::error::Error + Send + Sync>>;

    fn construct(ctx: &RepoContext) -> Result<Self, Self::Error>;
}

impl Subject for RepoSnapshot {
    type Error = gitai_git::Error;

    fn construct(ctx: &RepoContext) -> Result<Self, Self::Error> {
        RepoSnapshot::open(ctx.root())
    }
}
