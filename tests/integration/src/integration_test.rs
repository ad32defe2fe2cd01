//! End-to-end tests: config file -> seeded repository -> subject
//!
//! Seed configs live in `test-fixtures/configs/` at the workspace root.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use gitai_fixture::{FixtureConfig, RepoContext, Subject, SubjectFixture, TempGitRepo};
use gitai_git::RepoSnapshot;
use pretty_assertions::assert_eq;

fn fixture_config(name: &str) -> FixtureConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/configs")
        .join(name);
    FixtureConfig::load(&path).unwrap()
}

/// Stand-in for the tool under test: discovers the project it runs in.
#[derive(Debug)]
struct ProjectScanner {
    project_name: Option<String>,
    tracked: Vec<String>,
}

impl Subject for ProjectScanner {
    type Error = gitai_fixture::FixtureError;

    fn construct(ctx: &RepoContext) -> Result<Self, Self::Error> {
        let project_name = ctx.read_file("pyproject.toml").ok().and_then(|content| {
            content
                .lines()
                .find_map(|line| line.strip_prefix("name = "))
                .map(|name| name.trim_matches('"').to_string())
        });
        let tracked = ctx
            .git(&["ls-files"])?
            .stdout
            .lines()
            .map(str::to_string)
            .collect();

        Ok(Self {
            project_name,
            tracked,
        })
    }
}

#[test]
fn pinned_config_reproduces_the_same_commit() {
    let config = fixture_config("pinned.toml");
    assert_eq!(
        config.seed.commit_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    );

    let first = TempGitRepo::with_config(&config).unwrap();
    let second = TempGitRepo::with_config(&config).unwrap();

    assert_eq!(first.context().head(), second.context().head());
    assert_eq!(first.context().branch(), "main");
    assert_ne!(first.path(), second.path());
    let name = first.path().file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("gitai-pinned-"), "got {name}");
}

#[test]
fn project_config_seeds_all_files_in_one_commit() {
    let fixture =
        SubjectFixture::<ProjectScanner>::with_config(&fixture_config("python-project.toml"))
            .unwrap();

    let scanner = fixture.subject();
    assert_eq!(scanner.project_name.as_deref(), Some("demo"));
    assert_eq!(
        scanner.tracked,
        vec![
            "README.md".to_string(),
            "pyproject.toml".to_string(),
            "src/demo/__init__.py".to_string(),
        ]
    );

    let snapshot = fixture.context().snapshot().unwrap();
    assert_eq!(snapshot.commit_count().unwrap(), 1);
    assert_eq!(snapshot.head_commit().unwrap().message, "Scaffold project");
}

#[test]
fn default_fixture_matches_baseline_repository() {
    let fixture = SubjectFixture::<RepoSnapshot>::with_config(&FixtureConfig::default()).unwrap();
    let snapshot = fixture.subject();

    assert_eq!(snapshot.commit_count().unwrap(), 1);
    assert_eq!(snapshot.head_files().unwrap(), vec!["README.md".to_string()]);
    assert_eq!(
        snapshot.read_head_file("README.md").unwrap(),
        "# Test Repository\n"
    );

    let head = snapshot.head_commit().unwrap();
    assert_eq!(head.author, "Test User");
    assert_eq!(head.email, "test@example.com");
    assert_eq!(head.message, "Initial commit");
}
