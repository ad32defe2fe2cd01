//! Fixture configuration
//!
//! Resolution order: built-in defaults, then the TOML file named by
//! `GITAI_FIXTURE_CONFIG`, then individual environment overrides.
//!
//! ```toml
//! [workspace]
//! prefix = "gitai-"
//! keep = false
//! enter_directory = false
//!
//! [git]
//! program = "/usr/bin/git"
//! isolate = true
//!
//! [seed]
//! message = "Initial commit"
//! initial_branch = "main"
//!
//! [[seed.files]]
//! path = "README.md"
//! contents = "# Test Repository\n"
//! ```

use std::path::{Path, PathBuf};

use gitai_fs::{WorkspaceOptions, workspace::DEFAULT_PREFIX};
use gitai_git::{GitCli, SeedPlan};
use serde::{Deserialize, Serialize};

use crate::{FixtureError, Result};

/// Path of a TOML config file to load
pub const ENV_CONFIG: &str = "GITAI_FIXTURE_CONFIG";
/// Git executable to use
pub const ENV_GIT: &str = "GITAI_FIXTURE_GIT";
/// Keep workspaces on disk after the fixture is released
pub const ENV_KEEP: &str = "GITAI_FIXTURE_KEEP";
/// Parent directory for workspaces
pub const ENV_TMPDIR: &str = "GITAI_FIXTURE_TMPDIR";

/// Where and how the temporary workspace is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    pub prefix: String,
    pub parent: Option<PathBuf>,
    /// Leave the workspace on disk for post-mortem inspection
    pub keep: bool,
    /// Also change the process working directory into the workspace
    pub enter_directory: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            parent: None,
            keep: false,
            enter_directory: false,
        }
    }
}

/// Which git binary runs the seeding steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// `git` on `PATH` when unset
    pub program: Option<PathBuf>,
    pub isolate: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: None,
            isolate: true,
        }
    }
}

/// Complete fixture configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub workspace: WorkspaceSettings,
    pub git: GitSettings,
    pub seed: SeedPlan,
}

impl FixtureConfig {
    /// Load configuration from a TOML file; missing keys take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = gitai_fs::io::read_text(path)?;
        toml::from_str(&content).map_err(|e| FixtureError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve configuration from the process environment.
    pub fn resolve() -> Result<Self> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve configuration using `lookup` in place of the environment.
    pub fn resolve_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(ENV_CONFIG).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env_with(&lookup)?;
        tracing::debug!(?config, "Resolved fixture config");
        Ok(config)
    }

    /// Apply the individual environment overrides on top of `self`.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(program) = lookup(ENV_GIT).filter(|v| !v.trim().is_empty()) {
            self.git.program = Some(PathBuf::from(program));
        }
        if let Some(value) = lookup(ENV_KEEP) {
            self.workspace.keep = parse_flag(ENV_KEEP, &value)?;
        }
        if let Some(parent) = lookup(ENV_TMPDIR).filter(|v| !v.trim().is_empty()) {
            self.workspace.parent = Some(PathBuf::from(parent));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: SeedPlan) -> Self {
        self.seed = seed;
        self
    }

    /// Enable legacy mode that changes the process working directory.
    pub fn entering_directory(mut self, enter: bool) -> Self {
        self.workspace.enter_directory = enter;
        self
    }

    pub fn keeping_workspace(mut self, keep: bool) -> Self {
        self.workspace.keep = keep;
        self
    }

    pub fn with_git_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.git.program = Some(program.into());
        self
    }

    pub fn workspace_options(&self) -> WorkspaceOptions {
        let mut options = WorkspaceOptions::new()
            .with_prefix(&self.workspace.prefix)
            .keep(self.workspace.keep)
            .enter(self.workspace.enter_directory);
        if let Some(parent) = &self.workspace.parent {
            options = options.in_parent(parent);
        }
        options
    }

    pub fn git_cli(&self) -> GitCli {
        let git = GitCli::new().isolated(self.git.isolate);
        match &self.git.program {
            Some(program) => git.with_program(program),
            None => git,
        }
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FixtureError::InvalidEnv {
            var,
            value: value.to_string(),
        }),
    }
}
