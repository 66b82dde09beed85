//! Per-repository configuration (`<repo-root>/.orchard.yaml`).
//!
//! Pure input to the allocator and the orchestrator; nothing in Orchard
//! writes this file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};
use crate::paths::{config_path, default_worktree_base};
use crate::ports::MAX_PORT;

pub const DEFAULT_BASE_PORT: u16 = 61000;
pub const DEFAULT_BLOCK_SIZE: u16 = 10;

/// Lifecycle hook commands, each run through `sh -c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scripts {
    pub setup: Option<String>,
    pub run: Option<String>,
    pub archive: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_port: u16,
    pub port_block_size: u16,
    /// Relative paths resolve against the repository root.
    pub worktree_dir: Option<PathBuf>,
    /// Files or directories copied from the root worktree on create.
    pub copy: Vec<String>,
    pub scripts: Scripts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_port: DEFAULT_BASE_PORT,
            port_block_size: DEFAULT_BLOCK_SIZE,
            worktree_dir: None,
            copy: Vec::new(),
            scripts: Scripts::default(),
        }
    }
}

impl Config {
    /// Load `<repo_root>/.orchard.yaml`; defaults when absent.
    pub fn load_at(repo_root: &Path) -> Result<Self, CoreError> {
        let path = config_path(repo_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| CoreError::InvalidConfig {
                path: path.clone(),
                message: e.to_string(),
            })?
        };
        config.validate(&path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), CoreError> {
        let invalid = |message: String| CoreError::InvalidConfig {
            path: path.to_path_buf(),
            message,
        };
        if self.port_block_size == 0 {
            return Err(invalid("port_block_size must be at least 1".into()));
        }
        let last = u32::from(self.base_port) + u32::from(self.port_block_size) - 1;
        if last > MAX_PORT {
            return Err(invalid(format!(
                "base_port {} with block size {} exceeds port {MAX_PORT}",
                self.base_port, self.port_block_size
            )));
        }
        for entry in &self.copy {
            let entry_path = Path::new(entry);
            if entry_path.is_absolute()
                || entry_path
                    .components()
                    .any(|c| matches!(c, std::path::Component::ParentDir))
            {
                return Err(invalid(format!(
                    "copy entry '{entry}' must be relative to the repository root"
                )));
            }
        }
        Ok(())
    }

    /// Directory under which new worktrees are created.
    pub fn worktree_base(&self, repo_root: &Path, home: &Path, repo_name: &str) -> PathBuf {
        match &self.worktree_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => repo_root.join(dir),
            None => default_worktree_base(home, repo_name),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
