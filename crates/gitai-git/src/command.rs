//! Invocation of the external `git` binary
//!
//! Every call sets its working directory explicitly and captures output;
//! nothing here reads or changes the process working directory.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, OnceLock};

use regex::Regex;
use semver::Version;

use crate::{Error, Result};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("version pattern is valid")
});

/// Environment applied to every invocation of an isolated runner.
const ISOLATION_ENV: &[(&str, &str)] = &[
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GIT_CONFIG_GLOBAL", NULL_DEVICE),
];

/// Variables that point git at some other repository. Hooks and
/// `git rebase -x` export these to their children.
const REPOSITORY_ENV: &[&str] = &[
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_COMMON_DIR",
    "GIT_INDEX_FILE",
    "GIT_OBJECT_DIRECTORY",
    "GIT_ALTERNATE_OBJECT_DIRECTORIES",
    "GIT_NAMESPACE",
    "GIT_PREFIX",
    "GIT_CONFIG",
    "GIT_CONFIG_PARAMETERS",
    "GIT_CONFIG_COUNT",
];

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// `GIT_CONFIG_GLOBAL` is honoured from 2.32 on.
const GLOBAL_CONFIG_ENV_SINCE: Version = Version::new(2, 32, 0);

/// Captured output of a successful git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Stdout with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Runner for the git command-line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    isolate: bool,
    envs: Vec<(OsString, OsString)>,
    version: OnceLock<Version>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Runner for `git` on `PATH`, isolated from system configuration.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
            isolate: true,
            envs: Vec::new(),
            version: OnceLock::new(),
        }
    }

    /// Use a specific git executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self.version = OnceLock::new();
        self
    }

    /// Toggle isolation from the host environment.
    ///
    /// An isolated runner ignores system and global git configuration,
    /// never prompts, and drops every variable that would point git at a
    /// repository other than the working directory, whether inherited or
    /// added with [`GitCli::env`].
    pub fn isolated(mut self, isolate: bool) -> Self {
        self.isolate = isolate;
        self
    }

    /// Add an environment variable to every invocation.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn is_isolated(&self) -> bool {
        self.isolate
    }

    /// Run `git <args>` in `dir`.
    pub fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput> {
        self.run_with_env(dir, args, &[])
    }

    /// Run `git <args>` in `dir` with additional environment variables.
    pub fn run_with_env(
        &self,
        dir: &Path,
        args: &[&str],
        extra_env: &[(&str, String)],
    ) -> Result<GitOutput> {
        let mut cmd = self.command(args);
        cmd.current_dir(dir);
        for (key, value) in extra_env {
            cmd.env(key, value);
        }
        self.execute(cmd, args, Some(dir))
    }

    /// Installed git version, parsed from `git --version`.
    ///
    /// Detected once per runner.
    pub fn version(&self) -> Result<Version> {
        if let Some(version) = self.version.get() {
            return Ok(version.clone());
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg("--version");
        let output = self.execute(cmd, &["--version"], None)?;
        let version = parse_version(&output.stdout)?;
        let _ = self.version.set(version.clone());
        Ok(version)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k, v)));
        if self.isolate {
            self.isolate_command(&mut cmd);
        }
        cmd
    }

    fn isolate_command(&self, cmd: &mut Command) {
        for key in REPOSITORY_ENV {
            cmd.env_remove(key);
        }
        cmd.envs(ISOLATION_ENV.iter().copied());

        // Older git ignores GIT_CONFIG_GLOBAL, so hide the files it would read
        // instead. A missing version surfaces as an error from the command.
        if self
            .version()
            .is_ok_and(|version| version < GLOBAL_CONFIG_ENV_SINCE)
        {
            cmd.env("HOME", NULL_DEVICE);
            cmd.env("XDG_CONFIG_HOME", NULL_DEVICE);
        }
    }

    fn execute(&self, mut cmd: Command, args: &[&str], dir: Option<&Path>) -> Result<GitOutput> {
        let joined = args.join(" ");
        tracing::debug!(
            program = %self.program.display(),
            args = %joined,
            dir = ?dir,
            "Running git"
        );

        let output = cmd.output().map_err(|source| {
            // A missing working directory also surfaces as NotFound
            let dir_missing = dir.is_some_and(|d| !d.is_dir());
            if source.kind() == std::io::ErrorKind::NotFound && !dir_missing {
                Error::GitNotFound {
                    program: self.program.clone(),
                }
            } else {
                Error::Spawn {
                    program: self.program.clone(),
                    source,
                }
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(GitOutput { stdout, stderr })
        } else {
            tracing::debug!(args = %joined, stderr = %stderr.trim(), "git exited with failure");
            Err(Error::CommandFailed {
                args: joined,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

/// Parse a version out of `git --version` output.
///
/// Accepts vendor suffixes such as `2.39.3 (Apple Git-146)` or
/// `2.43.0.windows.1`; a missing patch component counts as zero.
pub fn parse_version(output: &str) -> Result<Version> {
    let caps = VERSION_RE
        .captures(output)
        .ok_or_else(|| Error::VersionParse {
            output: output.trim().to_string(),
        })?;

    let part = |i: usize| -> Result<u64> {
        caps.get(i).map_or(Ok(0), |m| {
            m.as_str().parse().map_err(|_| Error::VersionParse {
                output: output.trim().to_string(),
            })
        })
    };

    Ok(Version::new(part(1)?, part(2)?, part(3)?))
}
