//! Tests for the seeded repository and subject fixtures

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::{HeadReader, Unbuildable, isolated_config, temp_git_repo};
use gitai_fixture::{FixtureError, RepoContext, Subject, SubjectFixture, TempGitRepo};
use gitai_git::{RepoSnapshot, SeedPlan};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;

#[rstest]
fn readme_has_fixed_content(temp_git_repo: TempGitRepo) {
    let content = temp_git_repo.context().read_file("README.md").unwrap();

    assert_eq!(content, "# Test Repository\n");
}

#[rstest]
fn repository_has_exactly_one_commit_with_one_file(temp_git_repo: TempGitRepo) {
    let snapshot = temp_git_repo.context().snapshot().unwrap();

    assert_eq!(snapshot.commit_count().unwrap(), 1);
    assert_eq!(snapshot.head_files().unwrap(), vec!["README.md".to_string()]);
    assert_eq!(snapshot.head_commit().unwrap().id, temp_git_repo.context().head());
}

#[rstest]
fn context_root_is_the_fixture_path(temp_git_repo: TempGitRepo) {
    let ctx = temp_git_repo.context();

    assert_eq!(ctx.root(), temp_git_repo.path());
    assert!(ctx.root().join(".git").is_dir());
    assert!(!temp_git_repo.is_entered());
}

#[rstest]
fn context_refuses_paths_outside_the_repository(temp_git_repo: TempGitRepo) {
    let result = temp_git_repo.context().read_file("../outside.txt");

    assert!(matches!(
        result,
        Err(FixtureError::Fs(gitai_fs::Error::PathEscape { .. }))
    ));
}

#[rstest]
fn context_git_runs_in_repository(temp_git_repo: TempGitRepo) {
    let ctx = temp_git_repo.context();
    ctx.write_file("notes.txt", "scratch\n").unwrap();

    let status = ctx.git(&["status", "--porcelain"]).unwrap();

    assert_eq!(status.trimmed(), "?? notes.txt");
}

#[test]
fn close_removes_the_repository() {
    let repo = TempGitRepo::with_config(&isolated_config()).unwrap();
    let path = repo.path().to_path_buf();
    assert!(path.is_dir());

    repo.close().unwrap();

    assert!(!path.exists());
}

#[test]
fn drop_removes_the_repository() {
    let repo = TempGitRepo::with_config(&isolated_config()).unwrap();
    let path = repo.path().to_path_buf();

    drop(repo);

    assert!(!path.exists());
}

#[test]
fn custom_seed_plan_is_applied() {
    let config = isolated_config().with_seed(
        SeedPlan::new()
            .on_branch("main")
            .with_file("pyproject.toml", "[project]\nname = \"demo\"\n"),
    );

    let repo = TempGitRepo::with_config(&config).unwrap();
    let ctx = repo.context();

    assert_eq!(ctx.branch(), "main");
    assert_eq!(
        ctx.snapshot().unwrap().head_files().unwrap(),
        vec!["README.md".to_string(), "pyproject.toml".to_string()]
    );
}

#[test]
fn subject_is_built_against_the_seeded_repository() {
    let fixture = SubjectFixture::<HeadReader>::with_config(&isolated_config()).unwrap();

    assert_eq!(fixture.subject().head, fixture.context().head());
    assert_eq!(fixture.subject().readme, "# Test Repository\n");

    let path = fixture.repo().path().to_path_buf();
    fixture.close().unwrap();
    assert!(!path.exists());
}

#[test]
fn snapshot_is_a_ready_made_subject() {
    let fixture = SubjectFixture::<RepoSnapshot>::with_config(&isolated_config()).unwrap();

    assert_eq!(fixture.subject().commit_count().unwrap(), 1);
}

#[test]
fn subject_errors_name_the_subject_type() {
    let result = SubjectFixture::<Unbuildable>::with_config(&isolated_config());

    match result {
        Err(FixtureError::Subject { subject, source }) => {
            assert!(subject.ends_with("Unbuildable"), "got {subject}");
            assert!(source.to_string().starts_with("no GitAI configuration in "));
        }
        other => panic!("expected Subject error, got {other:?}"),
    }
}

#[rstest]
fn construct_with_accepts_closures(temp_git_repo: TempGitRepo) {
    let branch = temp_git_repo
        .construct_with(|ctx: &RepoContext| {
            Ok::<_, FixtureError>(ctx.git(&["branch", "--show-current"])?.trimmed().to_string())
        })
        .unwrap();

    assert_eq!(branch, temp_git_repo.context().branch());
}

static BUILT: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct Counted;

impl Subject for Counted {
    type Error = std::convert::Infallible;

    fn construct(_ctx: &RepoContext) -> Result<Self, Self::Error> {
        BUILT.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }
}

#[test]
fn failed_seeding_never_constructs_the_subject() {
    let parent = tempfile::TempDir::new().unwrap();
    let mut config = isolated_config().with_git_program("gitai-no-such-git");
    config.workspace.parent = Some(parent.path().to_path_buf());

    let result = SubjectFixture::<Counted>::with_config(&config);

    assert!(matches!(
        result,
        Err(FixtureError::Git(gitai_git::Error::GitNotFound { .. }))
    ));
    assert_eq!(BUILT.load(Ordering::SeqCst), 0);
    assert_eq!(
        std::fs::read_dir(parent.path()).unwrap().count(),
        0,
        "the workspace must be removed after seeding fails"
    );
}

#[test]
#[serial(cwd)]
fn enter_mode_changes_and_restores_cwd() {
    let before = std::env::current_dir().unwrap();
    let config = isolated_config().entering_directory(true);

    let repo = TempGitRepo::with_config(&config).unwrap();
    assert!(repo.is_entered());
    assert_eq!(
        dunce::canonicalize(std::env::current_dir().unwrap()).unwrap(),
        repo.path()
    );
    assert_eq!(
        std::fs::read_to_string("README.md").unwrap(),
        "# Test Repository\n"
    );
    // Already entered on this thread
    assert!(matches!(
        repo.enter(),
        Err(FixtureError::Fs(gitai_fs::Error::NestedCwdGuard))
    ));

    repo.close().unwrap();
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial(cwd)]
fn explicit_enter_guard_restores_cwd() {
    let before = std::env::current_dir().unwrap();
    let repo = TempGitRepo::with_config(&isolated_config()).unwrap();

    {
        let _guard = repo.enter().unwrap();
        assert!(std::path::Path::new(".git").is_dir());
    }

    assert_eq!(std::env::current_dir().unwrap(), before);
}
