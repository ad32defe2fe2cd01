use gitai_fixture::{FixtureConfig, RepoContext, Subject, TempGitRepo};
use rstest::fixture;

/// Configuration that ignores `GITAI_FIXTURE_*` variables on the host.
pub fn isolated_config() -> FixtureConfig {
    FixtureConfig::default()
}

#[fixture]
pub fn temp_git_repo() -> TempGitRepo {
    gitai_fixture::logging::init_for_tests();
    TempGitRepo::with_config(&isolated_config()).unwrap()
}

/// Subject that reads repository state when built.
#[derive(Debug)]
pub struct HeadReader {
    pub head: String,
    pub readme: String,
}

impl Subject for HeadReader {
    type Error = gitai_fixture::FixtureError;

    fn construct(ctx: &RepoContext) -> Result<Self, Self::Error> {
        Ok(Self {
            head: ctx.git(&["rev-parse", "HEAD"])?.trimmed().to_string(),
            readme: ctx.read_file("README.md")?,
        })
    }
}

/// Subject whose constructor always fails.
#[derive(Debug)]
pub struct Unbuildable;

#[derive(Debug, thiserror::Error)]
#[error("no GitAI configuration in {0}")]
pub struct MissingConfig(pub String);

impl Subject for Unbuildable {
    type Error = MissingConfig;

    fn construct(ctx: &RepoContext) -> Result<Self, Self::Error> {
        Err(MissingConfig(ctx.root().display().to_string()))
    }
}
