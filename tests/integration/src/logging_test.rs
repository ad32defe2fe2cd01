//! Global subscriber installation
//!
//! Kept in its own test binary: the first `init` in a process is the only
//! one that succeeds.

use gitai_fixture::{TempGitRepo, logging};

#[test]
fn init_installs_once_and_fixture_logs_flow_through_it() {
    logging::init().unwrap();

    let repo = TempGitRepo::new().unwrap();
    let root = repo.path().to_path_buf();
    repo.close().unwrap();
    assert!(!root.exists());

    assert!(logging::init().is_err());
    // The test helper tolerates the installed subscriber
    logging::init_for_tests();
}
