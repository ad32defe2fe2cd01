//! Teardown guarantees across the whole fixture stack

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;

use gitai_fixture::{
    FixtureConfig, FixtureError, RepoContext, Subject, SubjectFixture, TempGitRepo, with_subject,
    with_temp_git_repo,
};
use gitai_fs::{ScopedWorkspace, WorkspaceOptions};
use pretty_assertions::assert_eq;
use serial_test::serial;

#[derive(Debug)]
struct CwdRecorder {
    cwd_at_construction: PathBuf,
}

impl Subject for CwdRecorder {
    type Error = std::io::Error;

    fn construct(_ctx: &RepoContext) -> Result<Self, Self::Error> {
        Ok(Self {
            cwd_at_construction: std::env::current_dir()?,
        })
    }
}

#[test]
fn two_sequential_guards_use_distinct_directories_and_remove_both() {
    let mut seen = Vec::new();
    for _ in 0..2 {
        let scope = ScopedWorkspace::acquire(&WorkspaceOptions::new()).unwrap();
        seen.push(scope.path().to_path_buf());
        scope.release().unwrap();
    }

    assert_ne!(seen[0], seen[1]);
    assert!(seen.iter().all(|path| !path.exists()));
}

#[test]
fn closure_fixture_reads_readme_and_cleans_up() {
    let (content, root) = with_temp_git_repo(|ctx| {
        (
            ctx.read_file("README.md").unwrap(),
            ctx.root().to_path_buf(),
        )
    })
    .unwrap();

    assert_eq!(content, "# Test Repository\n");
    assert!(!root.exists());
}

#[test]
fn closure_subject_fixture_cleans_up() {
    let root = with_subject(|_snapshot: &mut gitai_git::RepoSnapshot, ctx| {
        ctx.root().to_path_buf()
    })
    .unwrap();

    assert!(!root.exists());
}

#[test]
fn panicking_test_body_still_removes_repository() {
    let mut root = None;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let repo = TempGitRepo::with_config(&FixtureConfig::default()).unwrap();
        root = Some(repo.path().to_path_buf());
        panic!("assertion inside the test body failed");
    }));

    assert!(outcome.is_err());
    assert!(!root.expect("repository was created").exists());
}

#[test]
#[serial(cwd)]
fn legacy_mode_builds_subject_inside_repository_and_restores_cwd() {
    let before = std::env::current_dir().unwrap();
    let config = FixtureConfig::default().entering_directory(true);

    let fixture = SubjectFixture::<CwdRecorder>::with_config(&config).unwrap();
    let root = fixture.repo().path().to_path_buf();
    assert_eq!(
        dunce::canonicalize(&fixture.subject().cwd_at_construction).unwrap(),
        root
    );

    fixture.close().unwrap();

    assert_eq!(std::env::current_dir().unwrap(), before);
    assert!(!root.exists());
}

#[test]
#[serial(cwd)]
fn legacy_mode_restores_cwd_when_test_body_panics() {
    let before = std::env::current_dir().unwrap();
    let config = FixtureConfig::default().entering_directory(true);
    let mut root = None;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let fixture = SubjectFixture::<CwdRecorder>::with_config(&config).unwrap();
        root = Some(fixture.repo().path().to_path_buf());
        panic!("test body failed while inside the repository");
    }));

    assert!(outcome.is_err());
    assert_eq!(std::env::current_dir().unwrap(), before);
    assert!(!root.expect("fixture was created").exists());
}

#[test]
#[serial(cwd)]
fn legacy_mode_restores_cwd_when_seeding_fails() {
    let before = std::env::current_dir().unwrap();
    let config = FixtureConfig::default()
        .entering_directory(true)
        .with_git_program("gitai-no-such-git");

    let result = SubjectFixture::<CwdRecorder>::with_config(&config);

    assert!(matches!(result, Err(FixtureError::Git(_))));
    assert_eq!(std::env::current_dir().unwrap(), before);
}
